//! Presenting a candidate message and reading the user's decision.

use std::io;

use dialoguer::Input;

use crate::commit::{CommitMessage, MAX_SUBJECT_LENGTH};
use crate::error::ValidationError;

const SEPARATOR_WIDTH: usize = 50;

/// What the user picked from the review menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Regenerate,
    Accept,
    Edit,
    Abort,
    /// Anything else, kept for the hint.
    Invalid(String),
}

/// Map menu input to a [`Choice`]. `3` is only valid when editing is allowed.
pub fn parse_choice(input: &str, allow_edit: bool) -> Choice {
    match input.trim() {
        "1" => Choice::Regenerate,
        "2" => Choice::Accept,
        "3" if allow_edit => Choice::Edit,
        "4" => Choice::Abort,
        other => Choice::Invalid(other.to_string()),
    }
}

/// Hint shown after an invalid choice.
pub fn invalid_choice_hint(allow_edit: bool) -> &'static str {
    if allow_edit {
        "Invalid choice. Please enter 1, 2, 3, or 4."
    } else {
        "Invalid choice. Please enter 1, 2, or 4."
    }
}

/// The candidate as shown to the user, with the subject length and any
/// validation warning.
pub fn render_preview(message: &CommitMessage, warning: Option<&ValidationError>) -> String {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    let subject_len = message.subject.chars().count();

    let mut out = String::new();
    if let Some(warning) = warning {
        out.push_str(&format!("Warning: {}\n", warning));
    }
    out.push_str("\nGenerated commit message:\n");
    out.push_str(&separator);
    out.push('\n');
    out.push_str(&message.subject);
    out.push('\n');
    if subject_len > MAX_SUBJECT_LENGTH {
        out.push_str(&format!(
            "({} chars, consider shortening to {} or less)\n",
            subject_len, MAX_SUBJECT_LENGTH
        ));
    } else {
        out.push_str(&format!("({} chars)\n", subject_len));
    }
    if message.has_body() {
        out.push('\n');
        out.push_str(&message.body);
        out.push('\n');
    }
    out.push_str(&separator);
    out.push('\n');
    out
}

/// The numbered menu. The edit entry is left out when editing is disabled.
pub fn render_menu(allow_edit: bool) -> String {
    let mut out = String::from("What would you like to do?\n");
    out.push_str("  1. Regenerate commit message\n");
    out.push_str("  2. Commit as-is\n");
    if allow_edit {
        out.push_str("  3. Edit message\n");
    }
    out.push_str("  4. Quit (unstage files staged by rune)\n");
    out
}

/// The interactive side of a review.
pub trait Reviewer {
    /// Show a candidate and its validation warning, if any.
    fn present(&mut self, message: &CommitMessage, warning: Option<&ValidationError>);

    /// Show the menu and return the raw answer.
    fn prompt_choice(&mut self, allow_edit: bool) -> io::Result<String>;

    /// A one-line status message.
    fn notice(&mut self, text: &str);
}

/// Reviewer on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalReviewer;

impl Reviewer for TerminalReviewer {
    fn present(&mut self, message: &CommitMessage, warning: Option<&ValidationError>) {
        print!("{}", render_preview(message, warning));
    }

    fn prompt_choice(&mut self, allow_edit: bool) -> io::Result<String> {
        print!("{}", render_menu(allow_edit));
        let prompt = if allow_edit {
            "Enter your choice (1-4)"
        } else {
            "Enter your choice (1, 2, 4)"
        };

        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(io::Error::other)
    }

    fn notice(&mut self, text: &str) {
        println!("{}", text);
    }
}
