//! Inlining of base64 `atob(...)` source URLs in player configurations.

use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::{Captures, Regex};

use super::fixed_point;
use crate::utils::pattern::{compile_regex_unsafe, find_filtered};

/// Substituted when the base64 payload does not decode to UTF-8.
pub const INVALID_SOURCE_URL: &str = "INVALID unpack_source_url";

// `q` and `q2` must be the same quote character
const HLS_SOURCE_PATTERN: &str = r#"source:\s*(?P<replace>window\.atob\((?P<q>["'])(?P<atob>[A-z0-9+/=]+)(?P<q2>["'])\)),\s*mimeType:\s*["']application/vnd\.apple\.mpegurl["']"#;
const URL_VAR_PATTERN: &str =
    r#"var\s\w+url=(?P<replace>atob\((?P<q>["'])(?P<atob>[A-z0-9+/=]+)(?P<q2>["'])\));"#;
const CLAPPR_PATTERN: &str = r#"Clappr\.Player\(\s*\{\s*source:\s*(?P<replace>window\.atob\((?P<q>["'])(?P<atob>[A-z0-9+/=]+)(?P<q2>["'])\))"#;

static HLS_SOURCE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(HLS_SOURCE_PATTERN, "HLS_SOURCE_RE"));
static URL_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(URL_VAR_PATTERN, "URL_VAR_RE"));
static CLAPPR_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(CLAPPR_PATTERN, "CLAPPR_RE"));

fn balanced_quotes(caps: &Captures) -> bool {
    caps.name("q").map(|m| m.as_str()) == caps.name("q2").map(|m| m.as_str())
}

fn decode_atob(payload: &str) -> String {
    STANDARD
        .decode(payload)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| INVALID_SOURCE_URL.to_string())
}

fn unpack_with(text: String, re: &Regex, stage: &str) -> String {
    fixed_point(text, stage, |text| {
        let caps = find_filtered(re, text, balanced_quotes)?;
        let replace = caps.name("replace")?.as_str();
        let quote = caps.name("q")?.as_str();
        let decoded = decode_atob(caps.name("atob")?.as_str());
        Some(text.replace(replace, &format!("{quote}{decoded}{quote}")))
    })
}

/// Replaces the three known `atob("...")` source idioms with the quoted URL
/// they decode to. Each idiom is applied to a fixed point in turn.
pub fn unpack_source_url(text: &str) -> String {
    let text = unpack_with(text.to_string(), &HLS_SOURCE_RE, "atob source");
    let text = unpack_with(text, &URL_VAR_RE, "atob url variable");
    unpack_with(text, &CLAPPR_RE, "atob Clappr source")
}
