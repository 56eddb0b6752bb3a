//! Commit message formatting and validation.

pub mod format;
pub mod message;

pub use format::{format_body, format_message, format_subject, wrap_text};
pub use message::{CommitMessage, MAX_BODY_LINE_LENGTH, MAX_SUBJECT_LENGTH, validate};
