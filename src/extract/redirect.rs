//! `window.location.href` redirect extraction.

use std::sync::LazyLock;

use regex::Regex;

use super::{CandidateKind, RawCandidate};
use crate::utils::pattern::compile_regex_unsafe;

const WINDOW_LOCATION_PATTERN: &str =
    r#"(?s)<script[^<]+window\.location\.href\s?=\s?["'](?P<url>[^"']+)["'];[^<>]+"#;

static WINDOW_LOCATION_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(WINDOW_LOCATION_PATTERN, "WINDOW_LOCATION_RE"));

/// Returns the target of the first `window.location.href = "..."` assignment
/// inside a script tag.
pub fn extract_window_location(html: &str) -> Option<RawCandidate> {
    let url = WINDOW_LOCATION_RE.captures(html)?.name("url")?;
    Some(RawCandidate::new(url.as_str(), CandidateKind::Redirect))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_redirect() {
        let html = "<html><script type=\"text/javascript\">\n  window.location.href = \"/live/next.html\";\n</script></html>";
        let candidate = extract_window_location(html).unwrap();
        assert_eq!(candidate.url, "/live/next.html");
        assert_eq!(candidate.kind, CandidateKind::Redirect);
    }

    #[test]
    fn test_first_assignment_wins() {
        let html = "<script>window.location.href='http://a.com/1'; </script><script>window.location.href='http://a.com/2'; </script>";
        assert_eq!(extract_window_location(html).unwrap().url, "http://a.com/1");
    }

    #[test]
    fn test_outside_script_ignored() {
        assert!(extract_window_location("<a onclick=\"window.location.href='x';\">").is_none());
    }
}
