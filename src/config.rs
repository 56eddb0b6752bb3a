//! User configuration and stored credentials.
//!
//! Both live as TOML under `<config dir>/rune/`: `config.toml` for
//! preferences and `credentials.toml` (owner-only) for API keys.

use std::env;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::llm::{Provider, default_model};

/// Default model request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable to override the request timeout.
pub const TIMEOUT_ENV_VAR: &str = "RUNE_TIMEOUT";

const CONFIG_FILE: &str = "config.toml";
const CREDENTIALS_FILE: &str = "credentials.toml";

/// Preferences from `config.toml`. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: Provider,
    /// Model id. Empty means the provider's default model.
    pub model: String,
    /// Only consider staged changes unless `--all` is given.
    pub staged_only: bool,
    /// Stage everything before generating when changes are included.
    pub auto_stage_all: bool,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_provider(Provider::OpenRouter)
    }
}

impl Config {
    /// Defaults with `provider` and its default model.
    pub fn for_provider(provider: Provider) -> Self {
        Self {
            provider,
            model: default_model(provider)
                .map(|model| model.id.to_string())
                .unwrap_or_default(),
            staged_only: false,
            auto_stage_all: true,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Request timeout. `RUNE_TIMEOUT` wins over `timeout_secs`.
    pub fn timeout(&self) -> Duration {
        let configured = if self.timeout_secs == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            self.timeout_secs
        };

        match env::var(TIMEOUT_ENV_VAR) {
            Ok(v) if !v.is_empty() => match v.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    warn!(
                        "Invalid {} value '{}', using {} seconds",
                        TIMEOUT_ENV_VAR, v, configured
                    );
                    Duration::from_secs(configured)
                }
            },
            _ => Duration::from_secs(configured),
        }
    }
}

/// API keys from `credentials.toml`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openrouter_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
}

impl Credentials {
    /// Key for `provider`: the environment variable if set, else the stored key.
    pub fn api_key(&self, provider: Provider) -> Option<String> {
        env::var(provider.api_key_env())
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .or_else(|| self.stored_key(provider).map(str::to_string))
    }

    pub fn stored_key(&self, provider: Provider) -> Option<&str> {
        let key = match provider {
            Provider::OpenRouter => &self.openrouter_api_key,
            Provider::Gemini => &self.gemini_api_key,
        };
        key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }

    pub fn set_api_key(&mut self, provider: Provider, key: String) {
        let slot = match provider {
            Provider::OpenRouter => &mut self.openrouter_api_key,
            Provider::Gemini => &mut self.gemini_api_key,
        };
        *slot = Some(key);
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("openrouter_api_key", &redact(&self.openrouter_api_key))
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .finish()
    }
}

/// Reads and writes the files in one config directory.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// `<user config dir>/rune`.
    pub fn default_location() -> Result<Self, ConfigError> {
        dirs::config_dir()
            .map(|dir| Self::at(dir.join("rune")))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.dir.join(CREDENTIALS_FILE)
    }

    /// The stored config, or `None` before first-run setup.
    pub fn load(&self) -> Result<Option<Config>, ConfigError> {
        read_toml(&self.config_path())
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;
        write_file(&self.config_path(), &contents, false)
    }

    /// Make `model` on `provider` the default, keeping the other settings.
    pub fn set_default_model(&self, provider: Provider, model: &str) -> Result<Config, ConfigError> {
        let mut config = self.load()?.unwrap_or_default();
        config.provider = provider;
        config.model = model.to_string();
        self.save(&config)?;
        Ok(config)
    }

    /// Stored credentials; empty when the file does not exist.
    pub fn load_credentials(&self) -> Result<Credentials, ConfigError> {
        Ok(read_toml(&self.credentials_path())?.unwrap_or_default())
    }

    /// Write credentials readable by the owner only.
    pub fn save_credentials(&self, credentials: &Credentials) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(credentials).map_err(ConfigError::Serialize)?;
        write_file(&self.credentials_path(), &contents, true)
    }
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} does not exist", path.display());
            return Ok(None);
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    toml::from_str(&contents)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

fn write_file(path: &Path, contents: &str, private: bool) -> Result<(), ConfigError> {
    let write_err = |source: std::io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    if private {
        owner_only_on_create(&mut options);
    }

    let mut file = options.open(path).map_err(write_err)?;
    file.write_all(contents.as_bytes()).map_err(write_err)?;

    // The create mode does not apply to a file that already existed.
    if private {
        restrict_to_owner(path).map_err(write_err)?;
    }

    debug!("Wrote {}", path.display());
    Ok(())
}

#[cfg(unix)]
fn owner_only_on_create(options: &mut fs::OpenOptions) {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(0o600);
}

#[cfg(not(unix))]
fn owner_only_on_create(_options: &mut fs::OpenOptions) {}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
