//! rune - A CLI tool that writes git commit messages from your pending changes.
//!
//! # Overview
//!
//! rune stages (or reads) the changes in a repository, asks a hosted LLM for a
//! commit message, normalises it to git conventions, and lets the user accept,
//! edit, regenerate or abort. Files rune stages on the user's behalf are
//! unstaged again unless the commit goes through.

pub mod commit;
pub mod config;
pub mod editor;
pub mod error;
pub mod git;
pub mod llm;
pub mod session;
pub mod setup;
pub mod ui;

// Re-export commonly used types
pub use commit::{CommitMessage, format_message, validate};
pub use config::{Config, ConfigStore, Credentials};
pub use error::{ConfigError, EditorError, FormatError, GitError, LlmError, SessionError, ValidationError};
pub use git::{DiffScope, Git, StagingReconciler};
pub use llm::{CommitMessageGenerator, Provider};
pub use session::{CommitSession, SessionOptions, SessionOutcome};
