//! Utilities for turning URLs into safe file names.

/// Sanitizes a URL for use as a file name.
///
/// Surrounding whitespace is trimmed, inner spaces become underscores, and
/// every character other than word characters, `-` and `.` is removed.
pub fn sanitize_filename(url: &str) -> String {
    url.trim()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_strips_url_punctuation() {
        assert_eq!(
            sanitize_filename("https://example.com/live?id=1"),
            "httpsexample.comliveid1"
        );
    }

    #[test]
    fn test_sanitize_filename_spaces() {
        assert_eq!(sanitize_filename("  a b-c  "), "a_b-c");
    }

    #[test]
    fn test_sanitize_filename_keeps_unicode_words() {
        assert_eq!(sanitize_filename("http://тест.рф/ü"), "httpтест.рфü");
    }
}
