//! Prompt construction for commit message generation.

/// Maximum diff length (in characters) embedded in the prompt.
pub const MAX_DIFF_LENGTH: usize = 4000;

/// Marker appended when the diff was cut.
const TRUNCATION_MARKER: &str = "\n... (diff truncated)";

/// System instruction shared by the chat-style providers.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that generates concise, descriptive Git commit messages. Focus on the primary change and keep the subject line under 50 characters.";

/// Build the user prompt for a diff.
pub fn build_commit_prompt(diff: &str) -> String {
    let diff = sanitize_diff(diff, MAX_DIFF_LENGTH);

    format!(
        r#"Generate a concise Git commit message for the following diff.

1. Subject line (first line):
   - Imperative mood ("Add", "Fix", "Update", "Remove")
   - At most 50 characters
   - No period at the end

2. If needed, a blank line followed by a body that:
   - Explains what changed and why, not how
   - Wraps at 72 characters per line
   - Uses present tense

Examples of good subjects:
- Add user authentication middleware
- Fix memory leak in image processing
- Update README with installation instructions

Git diff:
{diff}

Respond with ONLY the commit message (no quotes, no explanations):"#
    )
}

/// Strip control characters (keeping newlines and tabs) and cap the length
/// at `max_len` characters.
pub fn sanitize_diff(text: &str, max_len: usize) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    if cleaned.chars().count() <= max_len {
        return cleaned;
    }

    let mut truncated: String = cleaned.chars().take(max_len).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_diff() {
        let prompt = build_commit_prompt("+fn new_function() {}\n");
        assert!(prompt.contains("+fn new_function() {}"));
        assert!(prompt.contains("50 characters"));
    }

    #[test]
    fn test_short_diff_not_truncated() {
        let diff = "diff --git a/x b/x\n+hello";
        assert_eq!(sanitize_diff(diff, 100), diff);
    }

    #[test]
    fn test_long_diff_truncated_with_marker() {
        let diff = "a".repeat(5000);
        let sanitized = sanitize_diff(&diff, MAX_DIFF_LENGTH);
        assert!(sanitized.ends_with("... (diff truncated)"));
        assert_eq!(
            sanitized.chars().count(),
            MAX_DIFF_LENGTH + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let diff = "é".repeat(10);
        let sanitized = sanitize_diff(&diff, 5);
        assert!(sanitized.starts_with("ééééé"));
    }

    #[test]
    fn test_control_chars_removed() {
        let sanitized = sanitize_diff("a\u{1b}[31mred\u{0}\n\tb", 100);
        assert_eq!(sanitized, "a[31mred\n\tb");
    }
}
