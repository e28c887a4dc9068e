//! Unwrapping of `document.write(unescape("..."))` script blocks.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{fixed_point, percent_decode};
use crate::utils::pattern::{compile_regex_unsafe, find_filtered};

const UNESCAPE_PATTERN: &str = r#"<script[^<>]*>[^>]*document.write\(unescape\(\s*["'](?P<escaped>[^<>"']+)["']\)\);?[^<]*</script>"#;
const PERCENT_ESCAPE_PATTERN: &str = r"%\w{2}";

static UNESCAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(UNESCAPE_PATTERN, "UNESCAPE_RE"));
static PERCENT_ESCAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(PERCENT_ESCAPE_PATTERN, "PERCENT_ESCAPE_RE"));

// Only strings that actually contain an escape are unwrapped
fn has_escape(caps: &Captures) -> bool {
    caps.name("escaped")
        .is_some_and(|m| PERCENT_ESCAPE_RE.is_match(m.as_str()))
}

/// Replaces every `document.write(unescape(...))` script block with the
/// percent-decoded markup it writes.
pub fn unpack_unescape(text: &str) -> String {
    fixed_point(text.to_string(), "document.write(unescape)", |text| {
        let caps = find_filtered(&UNESCAPE_RE, text, has_escape)?;
        let whole = caps.get(0)?.as_str();
        let escaped = caps.name("escaped")?.as_str();
        Some(text.replace(whole, &percent_decode(escaped)))
    })
}
