//! The commit message value, its style checks, and rendering.

use std::fmt;

use crate::error::{FormatError, ValidationError};

/// Maximum length for commit subject lines, in characters.
pub const MAX_SUBJECT_LENGTH: usize = 50;

/// Maximum length for commit body lines, in characters.
pub const MAX_BODY_LINE_LENGTH: usize = 72;

/// Suffix appended to a truncated subject.
pub const ELLIPSIS: &str = "...";

/// A structured commit message.
///
/// Built by [`format_message`](crate::commit::format_message) from model output
/// or by [`CommitMessage::parse`] from user-edited text. An empty `body` means
/// the message has no body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    pub subject: String,
    pub body: String,
}

impl CommitMessage {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }

    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }

    /// Render the message for git.
    ///
    /// Produces the subject alone, or subject, a blank line, and the body.
    pub fn render(&self) -> String {
        if self.has_body() {
            format!("{}\n\n{}", self.subject, self.body)
        } else {
            self.subject.clone()
        }
    }

    /// Check this message against the subject-line conventions.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(Some(self))
    }

    /// Parse already-formatted text (for example after the user edited it).
    ///
    /// Unlike `format_message` this keeps the text as written: no wrapping,
    /// truncation or capitalisation. A blank second line separates the body;
    /// without one, everything after the first line is the body.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        if text.trim().is_empty() {
            return Err(FormatError::EmptyMessage);
        }

        let lines: Vec<&str> = text.trim_end().lines().collect();
        let subject = lines[0].trim();
        if subject.is_empty() {
            return Err(FormatError::EmptySubject);
        }

        let body = match lines.get(1) {
            None => String::new(),
            Some(second) if second.trim().is_empty() => lines[2..].join("\n"),
            Some(_) => lines[1..].join("\n"),
        };

        Ok(Self::new(subject, body.trim()))
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Check a message against the subject-line conventions.
///
/// Returns the first problem found. Lengths are counted in characters, not
/// bytes. A subject ending in the truncation ellipsis (`...`) is not treated
/// as ending with a period.
pub fn validate(message: Option<&CommitMessage>) -> Result<(), ValidationError> {
    let message = message.ok_or(ValidationError::NilMessage)?;
    let subject = message.subject.as_str();

    if subject.is_empty() {
        return Err(ValidationError::EmptySubject);
    }

    let length = subject.chars().count();
    if length > MAX_SUBJECT_LENGTH {
        return Err(ValidationError::SubjectTooLong {
            length,
            max: MAX_SUBJECT_LENGTH,
        });
    }

    if ends_with_period(subject) {
        return Err(ValidationError::TrailingPeriod);
    }

    if subject.chars().next().is_some_and(char::is_lowercase) {
        return Err(ValidationError::NotCapitalized);
    }

    Ok(())
}

/// True when the text ends in a single period rather than an ellipsis.
pub(crate) fn ends_with_period(text: &str) -> bool {
    text.ends_with('.') && !text.ends_with(ELLIPSIS)
}
