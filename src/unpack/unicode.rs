//! Unescaping of `\u0022...m3u8...\u0022` string literals.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::fixed_point;
use crate::utils::pattern::compile_regex_unsafe;

const ESCAPED_M3U8_PATTERN: &str = r"\\u0022[^\s,]+m3u8[^\s,]*\\u0022";
const UNICODE_ESCAPE_PATTERN: &str = r"\\u([0-9a-fA-F]{4})";

static ESCAPED_M3U8_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(ESCAPED_M3U8_PATTERN, "ESCAPED_M3U8_RE"));
static UNICODE_ESCAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(UNICODE_ESCAPE_PATTERN, "UNICODE_ESCAPE_RE"));

/// Decodes every `\uXXXX` escape in `s`. Lone surrogates are kept verbatim.
fn unicode_unescape(s: &str) -> String {
    UNICODE_ESCAPE_RE
        .replace_all(s, |caps: &Captures| {
            u32::from_str_radix(&caps[1], 16)
                .ok()
                .and_then(char::from_u32)
                .map_or_else(|| caps[0].to_string(), |c| c.to_string())
        })
        .into_owned()
}

/// Unescapes quoted, unicode-escaped strings that mention `m3u8`.
pub fn unpack_unicode_m3u8(text: &str) -> String {
    fixed_point(text.to_string(), "unicode m3u8", |text| {
        let escaped = ESCAPED_M3U8_RE.find(text)?.as_str();
        Some(text.replace(escaped, &unicode_unescape(escaped)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescapes_m3u8_literal() {
        let json = r#"{"hls":\u0022https:\u002F\u002Fcdn.example.com\u002Flive.m3u8\u0022, "x":1}"#;
        assert_eq!(
            unpack_unicode_m3u8(json),
            r#"{"hls":"https://cdn.example.com/live.m3u8", "x":1}"#
        );
    }

    #[test]
    fn test_other_escapes_untouched() {
        let json = r#"{"img":\u0022https:\u002F\u002Fcdn.example.com\u002Fa.png\u0022}"#;
        assert_eq!(unpack_unicode_m3u8(json), json);
    }

    #[test]
    fn test_lone_surrogate_kept() {
        assert_eq!(unicode_unescape(r"a\ud800b\u0041"), r"a\ud800bA");
    }
}
