//! Conversation title derivation.
//!
//! Titles are derived once, from the first user turn: the first 50 characters
//! of the message, with a trailing ellipsis marker when truncated.

/// Maximum title length in characters before truncation.
const TITLE_MAX_CHARS: usize = 50;

/// Derive a conversation title from the first user message.
///
/// Truncation counts characters, not bytes, so multi-byte content never
/// splits a character.
pub fn derive_title(first_user_message: &str) -> String {
    let mut chars = first_user_message.char_indices();
    match chars.nth(TITLE_MAX_CHARS) {
        Some((byte_idx, _)) => format!("{}...", &first_user_message[..byte_idx]),
        None => first_user_message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_unchanged() {
        assert_eq!(derive_title("Hello"), "Hello");
    }

    #[test]
    fn test_exactly_fifty_chars_unchanged() {
        let msg = "a".repeat(50);
        assert_eq!(derive_title(&msg), msg);
    }

    #[test]
    fn test_long_message_truncated_with_ellipsis() {
        let msg = "a".repeat(60);
        let title = derive_title(&msg);
        assert_eq!(title, format!("{}...", "a".repeat(50)));
        assert_eq!(title.chars().count(), 53);
    }

    #[test]
    fn test_multibyte_content_truncates_on_char_boundary() {
        let msg = "é".repeat(60);
        let title = derive_title(&msg);
        assert_eq!(title, format!("{}...", "é".repeat(50)));
    }

    #[test]
    fn test_empty_message() {
        assert_eq!(derive_title(""), "");
    }
}
