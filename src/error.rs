//! Error types for rune modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

use crate::llm::Provider;

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git executable not found in PATH")]
    NotInstalled,

    #[error("Not a git repository: {}", path.display())]
    NotARepository { path: PathBuf },

    #[error("Failed to run git {operation}: {source}")]
    Spawn {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} failed: {output}")]
    CommandFailed { operation: String, output: String },

    #[error("No changes found ({scope})")]
    NoChanges { scope: String },

    #[error("Failed to stage changes:\n{0}")]
    StageFailed(String),

    #[error("Failed to unstage files:\n{0}")]
    UnstageFailed(String),

    #[error("Failed to commit: {0}")]
    CommitFailed(String),

    #[error("Failed to write commit message file: {0}")]
    MessageFile(#[source] std::io::Error),
}

/// Errors from turning raw model output into a commit message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("empty commit message")]
    EmptyMessage,

    #[error("empty subject line")]
    EmptySubject,
}

/// Style problems found by `validate`. Reported as warnings, never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no commit message")]
    NilMessage,

    #[error("empty subject line")]
    EmptySubject,

    #[error("subject line too long: {length} characters (max {max})")]
    SubjectTooLong { length: usize, max: usize },

    #[error("subject line should not end with a period")]
    TrailingPeriod,

    #[error("subject line should start with a capital letter")]
    NotCapitalized,
}

/// Errors from the model client.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("No API key found for {0}. Run `rune --setup` or set {env}", env = .0.api_key_env())]
    MissingApiKey(Provider),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("{provider} API request failed with status {status}: {body}")]
    Api {
        provider: Provider,
        status: u16,
        body: String,
    },

    #[error("{0} returned an empty response")]
    EmptyResponse(Provider),

    #[error("Model request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Failed to generate commit message: {0}")]
    GenerationFailed(String),
}

/// Errors from loading or saving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the user config directory")]
    NoConfigDir,

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] toml::ser::Error),

    #[error("Setup cancelled: {0}")]
    SetupCancelled(String),
}

/// Errors from the external editor round-trip.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Failed to prepare temp file for editor: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("Failed to spawn editor '{editor}': {source}")]
    Spawn {
        editor: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Editor '{editor}' exited with {status}")]
    EditorFailed { editor: String, status: String },
}

/// Errors from the interactive commit session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error("Failed to read input: {0}")]
    Input(#[source] std::io::Error),
}

impl SessionError {
    /// Concrete next steps for the user, shown under the error.
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            SessionError::Git(GitError::NotARepository { .. }) => vec![
                "Navigate to your project directory",
                "Initialize a repository with 'git init'",
            ],
            SessionError::Git(GitError::NotInstalled) => {
                vec!["Install git and make sure it is on your PATH"]
            }
            SessionError::Git(GitError::NoChanges { .. }) => vec![
                "Stage changes first with 'git add <file>'",
                "Use --all to include unstaged changes",
                "Check 'git status'",
            ],
            SessionError::Git(GitError::StageFailed(_) | GitError::UnstageFailed(_)) => vec![
                "Check 'git status' for index lock files or conflicts",
            ],
            SessionError::Git(
                GitError::Spawn { .. } | GitError::CommandFailed { .. } | GitError::MessageFile(_),
            ) => vec!["Check 'git status' and that git runs in this directory"],
            SessionError::Git(GitError::CommitFailed(_)) => vec![
                "Check the output of your commit hooks",
                "Make sure user.name and user.email are configured",
            ],
            SessionError::Llm(LlmError::MissingApiKey(_)) => vec![
                "Run 'rune --setup' to reconfigure",
                "Check credentials in your environment",
            ],
            SessionError::Llm(LlmError::ModelNotFound(_)) => vec![
                "Run 'rune --list-models' to see available models",
                "Use a short name like 'd' or 'g2'",
            ],
            SessionError::Llm(LlmError::Timeout(_)) => vec![
                "Try again, the service might be temporarily slow",
                "Reduce the size of your changes",
                "Raise timeout_secs in your config or set RUNE_TIMEOUT",
            ],
            SessionError::Llm(_) => vec![
                "Check your internet connection",
                "Check credentials and remaining quota with your provider",
                "Run 'rune --setup' to reconfigure",
            ],
            SessionError::Editor(_) => vec!["Set $VISUAL or $EDITOR to an editor that can run here"],
            SessionError::Format(_) | SessionError::Input(_) => vec!["Try again or regenerate"],
        }
    }
}
