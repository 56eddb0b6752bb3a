//! Editing a commit message in the user's editor.

use std::env;
use std::io::Write;
use std::process::Command;

use tracing::debug;

use crate::error::EditorError;

const FALLBACK_EDITOR: &str = "vi";

/// Lets the user rewrite a message.
pub trait MessageEditor {
    /// Returns the edited text trimmed, or `None` if the user left it blank.
    fn edit(&self, initial: &str) -> Result<Option<String>, EditorError>;
}

/// `$VISUAL`, then `$EDITOR`, then `vi`.
pub fn resolve_editor() -> String {
    ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| env::var(var).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
}

/// Opens a temp file in an external editor process.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    /// Editor command from the environment.
    pub fn from_env() -> Self {
        Self::new(resolve_editor())
    }

    /// `command` may carry arguments, e.g. `code --wait`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl MessageEditor for ExternalEditor {
    fn edit(&self, initial: &str) -> Result<Option<String>, EditorError> {
        let mut temp_file = tempfile::Builder::new()
            .prefix("rune-")
            .suffix(".txt")
            .tempfile()
            .map_err(EditorError::TempFile)?;
        temp_file
            .write_all(initial.as_bytes())
            .and_then(|()| temp_file.flush())
            .map_err(EditorError::TempFile)?;

        let mut parts = self.command.split_whitespace();
        let program = parts.next().unwrap_or(FALLBACK_EDITOR);
        debug!("Opening {} in {}", temp_file.path().display(), self.command);

        let status = Command::new(program)
            .args(parts)
            .arg(temp_file.path())
            .status()
            .map_err(|source| EditorError::Spawn {
                editor: self.command.clone(),
                source,
            })?;

        if !status.success() {
            return Err(EditorError::EditorFailed {
                editor: self.command.clone(),
                status: status.to_string(),
            });
        }

        let content = std::fs::read_to_string(temp_file.path()).map_err(EditorError::TempFile)?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        Ok(Some(trimmed.to_string()))
    }
}
