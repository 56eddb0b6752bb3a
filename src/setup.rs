//! First-run setup wizard.

use dialoguer::{Confirm, Password, Select};

use crate::config::{Config, ConfigStore, Credentials};
use crate::error::ConfigError;
use crate::llm::Provider;

/// Everything the wizard asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupAnswers {
    pub provider: Provider,
    /// `None` keeps whatever key is already stored.
    pub api_key: Option<String>,
    pub staged_only: bool,
    pub auto_stage_all: bool,
}

fn key_url(provider: Provider) -> &'static str {
    match provider {
        Provider::OpenRouter => "https://openrouter.ai/keys",
        Provider::Gemini => "https://aistudio.google.com/app/apikey",
    }
}

/// Ask the questions on the terminal.
pub fn prompt_answers(current: &Config, credentials: &Credentials) -> Result<SetupAnswers, ConfigError> {
    let cancelled = |e: dialoguer::Error| ConfigError::SetupCancelled(e.to_string());

    println!("Welcome to rune!");
    println!("Let's set up your AI provider for generating commit messages.\n");

    let items: Vec<&str> = Provider::ALL.iter().map(|p| p.display_name()).collect();
    let default_index = Provider::ALL
        .iter()
        .position(|p| *p == current.provider)
        .unwrap_or(0);
    let selected = Select::new()
        .with_prompt("Choose your AI provider")
        .items(&items)
        .default(default_index)
        .interact()
        .map_err(cancelled)?;
    let provider = Provider::ALL[selected];

    let has_key = credentials.api_key(provider).is_some();
    println!("\nGet your API key at: {}", key_url(provider));
    let prompt = if has_key {
        format!("{} API key (leave empty to keep the current one)", provider)
    } else {
        format!("{} API key", provider)
    };
    let api_key = Password::new()
        .with_prompt(prompt)
        .allow_empty_password(has_key)
        .interact()
        .map_err(cancelled)?;
    let api_key = Some(api_key.trim().to_string()).filter(|key| !key.is_empty());

    let staged_only = Confirm::new()
        .with_prompt("Only use staged changes by default?")
        .default(current.staged_only)
        .interact()
        .map_err(cancelled)?;

    let auto_stage_all = Confirm::new()
        .with_prompt("Stage all changes automatically when generating?")
        .default(current.auto_stage_all)
        .interact()
        .map_err(cancelled)?;

    Ok(SetupAnswers {
        provider,
        api_key,
        staged_only,
        auto_stage_all,
    })
}

/// Persist wizard answers. Switching provider resets the model to that
/// provider's default.
pub fn apply_answers(
    store: &ConfigStore,
    current: &Config,
    credentials: &Credentials,
    answers: SetupAnswers,
) -> Result<(Config, Credentials), ConfigError> {
    let model = if answers.provider == current.provider && !current.model.trim().is_empty() {
        current.model.clone()
    } else {
        Config::for_provider(answers.provider).model
    };

    let config = Config {
        provider: answers.provider,
        model,
        staged_only: answers.staged_only,
        auto_stage_all: answers.auto_stage_all,
        timeout_secs: current.timeout_secs,
    };

    let mut credentials = credentials.clone();
    if let Some(key) = answers.api_key {
        credentials.set_api_key(answers.provider, key);
        store.save_credentials(&credentials)?;
    } else if credentials.api_key(answers.provider).is_none() {
        return Err(ConfigError::SetupCancelled(format!(
            "no API key given for {}",
            answers.provider
        )));
    }

    store.save(&config)?;
    Ok((config, credentials))
}

/// Run the wizard end to end and save the result.
pub fn run_setup(store: &ConfigStore) -> Result<(Config, Credentials), ConfigError> {
    let current = store.load()?.unwrap_or_default();
    let credentials = store.load_credentials()?;

    let answers = prompt_answers(&current, &credentials)?;
    let (config, credentials) = apply_answers(store, &current, &credentials, answers)?;

    println!(
        "\nConfiguration saved to {}. Using {} with model {}\n",
        store.dir().display(),
        config.provider,
        config.model
    );
    Ok((config, credentials))
}
