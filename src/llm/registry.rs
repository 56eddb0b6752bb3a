//! Known models, their short names and aliases.

use crate::error::LlmError;
use crate::llm::Provider;

/// A model rune knows how to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    /// Full model id sent to the provider.
    pub id: &'static str,
    pub short_name: &'static str,
    pub name: &'static str,
    pub provider: Provider,
    pub description: &'static str,
    pub is_default: bool,
}

pub static MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "gemini-1.5-flash",
        short_name: "g15",
        name: "Gemini 1.5 Flash",
        provider: Provider::Gemini,
        description: "Fast and efficient model for quick tasks",
        is_default: false,
    },
    ModelInfo {
        id: "gemini-1.5-pro",
        short_name: "gp",
        name: "Gemini 1.5 Pro",
        provider: Provider::Gemini,
        description: "More capable model for complex reasoning",
        is_default: false,
    },
    ModelInfo {
        id: "gemini-2.0-flash-exp",
        short_name: "g2",
        name: "Gemini 2.0 Flash Experimental",
        provider: Provider::Gemini,
        description: "Latest experimental model with improved capabilities",
        is_default: true,
    },
    ModelInfo {
        id: "deepseek/deepseek-chat-v3:free",
        short_name: "dv3",
        name: "DeepSeek V3",
        provider: Provider::OpenRouter,
        description: "Large context window, excellent code understanding",
        is_default: true,
    },
    ModelInfo {
        id: "deepseek/deepseek-r1-0528:free",
        short_name: "dr1",
        name: "DeepSeek R1",
        provider: Provider::OpenRouter,
        description: "Advanced reasoning and code generation",
        is_default: false,
    },
    ModelInfo {
        id: "google/gemini-2.0-flash-exp:free",
        short_name: "g2f",
        name: "Gemini 2.0 Flash Experimental (free)",
        provider: Provider::OpenRouter,
        description: "Free tier via OpenRouter, large context",
        is_default: false,
    },
    ModelInfo {
        id: "mistralai/mistral-7b-instruct",
        short_name: "m7",
        name: "Mistral 7B Instruct",
        provider: Provider::OpenRouter,
        description: "Lightweight and efficient, good for quick code tasks",
        is_default: false,
    },
    ModelInfo {
        id: "meta-llama/llama-3.3-70b-instruct:free",
        short_name: "l3",
        name: "Llama 3.3 70B Instruct",
        provider: Provider::OpenRouter,
        description: "Strong programming capabilities",
        is_default: false,
    },
    ModelInfo {
        id: "gryphe/mythomax-l2-13b",
        short_name: "mx",
        name: "MythoMax L2 13B",
        provider: Provider::OpenRouter,
        description: "Good balance of speed and quality",
        is_default: false,
    },
    ModelInfo {
        id: "qwen/qwq-32b-preview",
        short_name: "qwq",
        name: "Qwen QwQ 32B Preview",
        provider: Provider::OpenRouter,
        description: "Strong at coding tasks",
        is_default: false,
    },
];

/// Alias -> short name.
static ALIASES: &[(&str, &str)] = &[
    ("d", "dv3"),
    ("deep", "dv3"),
    ("deepseek", "dv3"),
    ("g", "g2"),
    ("gemini", "g2"),
    ("google", "g2"),
    ("g1", "g15"),
    ("pro", "gp"),
    ("m", "m7"),
    ("mistral", "m7"),
    ("l", "l3"),
    ("llama", "l3"),
    ("mytho", "mx"),
    ("qwen", "qwq"),
    ("openrouter", "dv3"),
];

/// Find a model by id, short name, or alias (case-insensitive, in that order).
pub fn find_model(query: &str) -> Result<&'static ModelInfo, LlmError> {
    let query = query.trim().to_lowercase();

    if let Some(model) = MODELS.iter().find(|m| m.id.to_lowercase() == query) {
        return Ok(model);
    }
    if let Some(model) = find_by_short_name(&query) {
        return Ok(model);
    }

    ALIASES
        .iter()
        .find(|(alias, _)| *alias == query)
        .and_then(|(_, short)| find_by_short_name(short))
        .ok_or(LlmError::ModelNotFound(query))
}

fn find_by_short_name(short_name: &str) -> Option<&'static ModelInfo> {
    MODELS.iter().find(|m| m.short_name == short_name)
}

/// Resolve a `--model` argument to a provider and model id.
///
/// Unregistered queries containing `/` are passed through as OpenRouter ids.
pub fn resolve_model(query: &str) -> Result<(Provider, String), LlmError> {
    match find_model(query) {
        Ok(model) => Ok((model.provider, model.id.to_string())),
        Err(_) if query.contains('/') => Ok((Provider::OpenRouter, query.trim().to_string())),
        Err(e) => Err(e),
    }
}

/// The default model for a provider.
pub fn default_model(provider: Provider) -> Option<&'static ModelInfo> {
    MODELS
        .iter()
        .find(|m| m.provider == provider && m.is_default)
}

/// Models for a provider: default first, then by name.
pub fn models_for(provider: Provider) -> Vec<&'static ModelInfo> {
    let mut models: Vec<&'static ModelInfo> =
        MODELS.iter().filter(|m| m.provider == provider).collect();
    models.sort_by(|a, b| b.is_default.cmp(&a.is_default).then(a.name.cmp(b.name)));
    models
}

/// Aliases that point at `short_name`, shortest first, at most three.
fn aliases_for(short_name: &str) -> Vec<&'static str> {
    let mut aliases: Vec<&'static str> = ALIASES
        .iter()
        .filter(|(alias, target)| *target == short_name && alias.len() <= 6)
        .map(|(alias, _)| *alias)
        .collect();
    aliases.sort_by(|a, b| a.len().cmp(&b.len()).then(a.cmp(b)));
    aliases.truncate(3);
    aliases
}

/// Human-readable listing for `--list-models`.
pub fn format_model_list() -> String {
    let mut out = String::from("Available models:\n");

    for provider in Provider::ALL {
        out.push_str(&format!("\n  {}:\n", provider));
        for model in models_for(provider) {
            let aliases = aliases_for(model.short_name);
            let alias_text = if aliases.is_empty() {
                String::new()
            } else {
                format!(" | {}", aliases.join(", "))
            };
            let default_marker = if model.is_default { " (default)" } else { "" };
            out.push_str(&format!(
                "    {:<6}{} {}{}\n      {} - {}\n",
                model.short_name, alias_text, model.name, default_marker, model.id, model.description
            ));
        }
    }

    out.push_str("\nExamples:\n  rune --model d     # DeepSeek V3\n  rune --model g     # Gemini 2.0 Flash\n");
    out
}
