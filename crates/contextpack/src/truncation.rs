/// Truncate `content` to at most `max_chars` characters (not bytes).
///
/// Returns the kept prefix and whether anything was cut. The cut always
/// falls on a character boundary.
pub fn truncate_chars(content: &str, max_chars: usize) -> (&str, bool) {
    match content.char_indices().nth(max_chars) {
        Some((boundary, _)) => (&content[..boundary], true),
        None => (content, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_truncation_when_under_limit() {
        let (result, truncated) = truncate_chars("hello world", 100);
        assert_eq!(result, "hello world");
        assert!(!truncated);
    }

    #[test]
    fn exact_length_is_not_truncated() {
        let (result, truncated) = truncate_chars("abcde", 5);
        assert_eq!(result, "abcde");
        assert!(!truncated);
    }

    #[test]
    fn truncates_at_limit() {
        let (result, truncated) = truncate_chars("abcdefghij", 5);
        assert_eq!(result, "abcde");
        assert!(truncated);
    }

    #[test]
    fn counts_characters_not_bytes() {
        // Tamil letters are three bytes each in UTF-8.
        let text = "தமிழ்".repeat(10);
        let (result, truncated) = truncate_chars(&text, 7);
        assert!(truncated);
        assert_eq!(result.chars().count(), 7);
    }

    #[test]
    fn zero_limit_keeps_nothing() {
        let (result, truncated) = truncate_chars("abc", 0);
        assert_eq!(result, "");
        assert!(truncated);
    }
}
