//! Turn raw model output into a well-formed [`CommitMessage`].

use crate::commit::message::{
    CommitMessage, ELLIPSIS, MAX_BODY_LINE_LENGTH, MAX_SUBJECT_LENGTH, ends_with_period,
};
use crate::error::FormatError;

/// Format raw model output as a commit message.
///
/// The first non-blank line becomes the subject (see [`format_subject`]).
/// After it, one run of blank lines is skipped and the remaining lines form
/// the body, which is re-flowed paragraph by paragraph (see [`format_body`]).
pub fn format_message(raw: &str) -> Result<CommitMessage, FormatError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FormatError::EmptyMessage);
    }

    let mut lines = trimmed.lines();
    let first = lines.next().ok_or(FormatError::EmptyMessage)?;

    let subject = format_subject(first);
    if subject.is_empty() {
        return Err(FormatError::EmptySubject);
    }

    let rest: Vec<&str> = lines.skip_while(|line| line.trim().is_empty()).collect();
    let body = format_body(&rest.join("\n"));

    Ok(CommitMessage { subject, body })
}

/// Normalise a subject line.
///
/// Trims whitespace, strips trailing periods (an ellipsis is left alone),
/// uppercases the first character, and truncates anything longer than
/// [`MAX_SUBJECT_LENGTH`] characters to 47 characters plus `...`.
pub fn format_subject(subject: &str) -> String {
    let mut subject = subject.trim();
    while ends_with_period(subject) {
        subject = subject[..subject.len() - 1].trim_end();
    }

    let mut chars = subject.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };

    if capitalized.chars().count() > MAX_SUBJECT_LENGTH {
        let keep = MAX_SUBJECT_LENGTH - ELLIPSIS.len();
        let mut truncated: String = capitalized.chars().take(keep).collect();
        truncated.push_str(ELLIPSIS);
        return truncated;
    }

    capitalized
}

/// Re-flow body text.
///
/// Paragraphs are separated by blank lines. Each paragraph's words are packed
/// greedily into lines of at most [`MAX_BODY_LINE_LENGTH`] characters, and the
/// paragraphs are joined with exactly one blank line.
pub fn format_body(body: &str) -> String {
    let mut paragraphs: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in body.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs
        .iter()
        .map(|lines| wrap_text(&lines.join(" "), MAX_BODY_LINE_LENGTH))
        .filter(|wrapped| !wrapped.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Greedy word wrap.
///
/// No produced line is longer than `max_length` characters, except a single
/// word longer than the limit, which is kept whole on its own line.
pub fn wrap_text(text: &str, max_length: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if line_len > 0 && line_len + 1 + word_len > max_length {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }

        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line.push_str(word);
        line_len += word_len;
    }

    if !line.is_empty() {
        lines.push(line);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_subject_only() {
        let msg = format_message("add user authentication").unwrap();
        assert_eq!(msg.subject, "Add user authentication");
        assert_eq!(msg.body, "");
    }

    #[test]
    fn test_subject_trailing_period_with_body() {
        let msg =
            format_message("fix memory leak.\n\nImplement JWT-based authentication system").unwrap();
        assert_eq!(msg.subject, "Fix memory leak");
        assert_eq!(msg.body, "Implement JWT-based authentication system");
    }

    #[test]
    fn test_long_subject_truncated_to_fifty() {
        let raw = "x".repeat(80);
        let msg = format_message(&raw).unwrap();
        assert_eq!(msg.subject.chars().count(), 50);
        assert_eq!(msg.subject, format!("X{}...", "x".repeat(46)));
    }

    #[test]
    fn test_long_sentence_subject_truncated() {
        let msg = format_message(
            "this is a very long commit subject line that exceeds the seventy-two character limit and should be truncated",
        )
        .unwrap();
        assert_eq!(
            msg.subject,
            "This is a very long commit subject line that ex..."
        );
        assert_eq!(msg.validate(), Ok(()));
    }

    #[test]
    fn test_subject_with_extra_whitespace() {
        let msg = format_message("  fix bug  ").unwrap();
        assert_eq!(msg.subject, "Fix bug");
    }

    #[test]
    fn test_unicode_subject_capitalized() {
        let msg = format_message("añadir función").unwrap();
        assert_eq!(msg.subject, "Añadir función");

        let msg = format_message("éxito total").unwrap();
        assert_eq!(msg.subject, "Éxito total");
    }

    #[test]
    fn test_unicode_truncation_counts_characters() {
        let raw = "ü".repeat(60);
        let msg = format_message(&raw).unwrap();
        assert_eq!(msg.subject.chars().count(), 50);
        assert!(msg.subject.starts_with('Ü'));
        assert!(msg.subject.ends_with("..."));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(format_message(""), Err(FormatError::EmptyMessage));
        assert_eq!(format_message("  \n\t \n"), Err(FormatError::EmptyMessage));
    }

    #[test]
    fn test_leading_blank_lines_are_skipped() {
        let msg = format_message("\n\nSome body text").unwrap();
        assert_eq!(msg.subject, "Some body text");
        assert_eq!(msg.body, "");
    }

    #[test]
    fn test_lone_period_subject_is_empty() {
        assert_eq!(format_message("."), Err(FormatError::EmptySubject));
    }

    #[test]
    fn test_repeated_periods_all_stripped() {
        let msg = format_message("fix bug..").unwrap();
        assert_eq!(msg.subject, "Fix bug");
        assert_eq!(msg.validate(), Ok(()));

        assert_eq!(format_message("fix bug. .").unwrap().subject, "Fix bug");
    }

    #[test]
    fn test_ellipsis_subject_untouched() {
        let msg = format_message("Work in progress...").unwrap();
        assert_eq!(msg.subject, "Work in progress...");
    }

    #[test]
    fn test_body_wrapped_at_72() {
        let msg = format_message(
            "add feature\n\nThis is a very long line that should be wrapped at seventy-two characters to follow proper Git commit conventions and make the message readable in various Git tools",
        )
        .unwrap();
        assert!(msg.body.contains('\n'));
        for line in msg.body.lines() {
            assert!(line.chars().count() <= 72, "line too long: {line:?}");
        }
    }

    #[test]
    fn test_body_multiple_paragraphs() {
        let msg = format_message(
            "fix critical bug\n\nFirst paragraph explains the issue.\n\n\n\nSecond paragraph provides more context about the fix and why it was necessary.",
        )
        .unwrap();
        assert_eq!(msg.subject, "Fix critical bug");
        let paragraphs: Vec<&str> = msg.body.split("\n\n").collect();
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0], "First paragraph explains the issue.");
        assert!(!msg.body.contains("\n\n\n"));
    }

    #[test]
    fn test_body_lines_in_paragraph_reflowed() {
        let msg = format_message("Update docs\n\nshort\nlines\nhere").unwrap();
        assert_eq!(msg.body, "short lines here");
    }

    #[test]
    fn test_body_directly_after_subject() {
        let msg = format_message("Add parser\nHandles nested input").unwrap();
        assert_eq!(msg.subject, "Add parser");
        assert_eq!(msg.body, "Handles nested input");
    }

    #[test]
    fn test_format_does_not_mutate_input() {
        let raw = String::from("fix thing.");
        let _ = format_message(&raw).unwrap();
        assert_eq!(raw, "fix thing.");
    }

    #[test]
    fn test_wrap_short_text_unchanged() {
        assert_eq!(wrap_text("Short text", 72), "Short text");
    }

    #[test]
    fn test_wrap_exact_length() {
        let text = "a".repeat(72);
        assert_eq!(wrap_text(&text, 72), text);
    }

    #[test]
    fn test_wrap_long_line() {
        assert_eq!(
            wrap_text(
                "This is a very long line that should be wrapped at the specified length to ensure proper formatting",
                20
            ),
            "This is a very long\nline that should be\nwrapped at the\nspecified length to\nensure proper\nformatting"
        );
    }

    #[test]
    fn test_wrap_preserves_overlong_word() {
        assert_eq!(
            wrap_text("Supercalifragilisticexpialidocious short", 20),
            "Supercalifragilisticexpialidocious\nshort"
        );
    }

    #[test]
    fn test_wrap_overlong_word_alone_in_middle() {
        let long = "y".repeat(80);
        let text = format!("before {long} after");
        assert_eq!(wrap_text(&text, 72), format!("before\n{long}\nafter"));
    }

    #[test]
    fn test_wrap_empty_and_whitespace() {
        assert_eq!(wrap_text("", 72), "");
        assert_eq!(wrap_text("   \n  \t  ", 72), "");
    }

    #[test]
    fn test_subjects_always_satisfy_rules() {
        let inputs = [
            "add user authentication",
            "fix memory leak.",
            "  trailing spaces and period .  ",
            "über-long subject that keeps going and going well past the fifty character cap",
            "ß is lowercase without a single-char uppercase",
            "1. numbered start",
            "already Capitalized",
        ];
        for raw in inputs {
            let msg = format_message(raw).unwrap();
            assert!(msg.subject.chars().count() <= MAX_SUBJECT_LENGTH, "{raw}");
            assert!(!ends_with_period(&msg.subject), "{raw}");
            assert!(
                !msg.subject.chars().next().unwrap().is_lowercase(),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_render_round_trip_is_stable() {
        let raws = [
            "add user authentication",
            "fix memory leak.\n\nImplement JWT-based authentication system",
            "this is a very long commit subject line that exceeds the limit by a lot\n\nbody paragraph one that is long enough to need wrapping because it keeps going past seventy-two characters\n\nsecond",
        ];
        for raw in raws {
            let first = format_message(raw).unwrap();
            assert_eq!(first.validate(), Ok(()));
            let second = format_message(&first.render()).unwrap();
            assert_eq!(second.validate(), Ok(()));
            assert_eq!(first, second);
        }
    }
}
