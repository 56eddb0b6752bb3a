//! Commit message generation through hosted LLM providers.

pub mod gemini;
pub mod openrouter;
pub mod prompt;
pub mod registry;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::debug;

use crate::config::{Config, Credentials};
use crate::error::LlmError;

pub use gemini::GeminiClient;
pub use openrouter::OpenRouterClient;
pub use prompt::{MAX_DIFF_LENGTH, build_commit_prompt, sanitize_diff};
pub use registry::{ModelInfo, default_model, find_model, format_model_list, models_for, resolve_model};

/// Sampling temperature shared by both providers.
pub(crate) const TEMPERATURE: f32 = 0.3;

/// Supported LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenRouter,
    Gemini,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::OpenRouter, Provider::Gemini];

    /// Identifier used in the config file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenRouter => "openrouter",
            Provider::Gemini => "gemini",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenRouter => "OpenRouter",
            Provider::Gemini => "Google Gemini",
        }
    }

    /// Environment variable that overrides the stored API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::OpenRouter => "OPENROUTER_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Produces a raw commit message for a diff.
///
/// The output is unformatted model text; callers run it through
/// [`crate::commit::format_message`].
#[async_trait]
pub trait CommitMessageGenerator: Send + Sync {
    async fn generate(&self, diff: &str) -> Result<String, LlmError>;

    fn provider(&self) -> Provider;

    fn model(&self) -> &str;
}

/// Run `generator` with a deadline. Exceeding it yields [`LlmError::Timeout`].
pub async fn generate_with_timeout(
    generator: &dyn CommitMessageGenerator,
    diff: &str,
    deadline: Duration,
) -> Result<String, LlmError> {
    debug!(
        "Requesting commit message from {} ({}), timeout {}s",
        generator.provider(),
        generator.model(),
        deadline.as_secs()
    );

    timeout(deadline, generator.generate(diff))
        .await
        .map_err(|_| LlmError::Timeout(deadline.as_secs()))?
}

/// Build the generator for the configured provider, or for `model_override`
/// when given (which also selects that model's provider).
pub fn build_generator(
    config: &Config,
    credentials: &Credentials,
    model_override: Option<&str>,
) -> Result<Box<dyn CommitMessageGenerator>, LlmError> {
    let (provider, model) = match model_override {
        Some(query) => resolve_model(query)?,
        None if config.model.trim().is_empty() => {
            let model = default_model(config.provider)
                .ok_or_else(|| LlmError::ModelNotFound(config.provider.as_str().to_string()))?;
            (config.provider, model.id.to_string())
        }
        None => (config.provider, config.model.trim().to_string()),
    };

    let api_key = credentials
        .api_key(provider)
        .ok_or(LlmError::MissingApiKey(provider))?;

    debug!("Using {} model {}", provider, model);
    Ok(match provider {
        Provider::OpenRouter => Box::new(OpenRouterClient::new(api_key, model)),
        Provider::Gemini => Box::new(GeminiClient::new(api_key, model)),
    })
}
