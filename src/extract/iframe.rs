//! Iframe source extraction.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{CandidateKind, RawCandidate};
use crate::utils::pattern::{captures_filtered, compile_regex_unsafe};

// `<ifr"+"ame` splits the tag name to dodge naive scanners
const IFRAME_PATTERN: &str = r#"(?is)<ifr(?:["']\s?\+\s?["'])?ame(?P<attrs>.*?)src=["'](?P<url>[^"'\s<>]+)\s?["'][^<>]*?>"#;
const SENTINEL_FRAME_PATTERN: &str = r#"(?i)^\sname=["']g_iFrame"#;

static IFRAME_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(IFRAME_PATTERN, "IFRAME_RE"));
static SENTINEL_FRAME_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(SENTINEL_FRAME_PATTERN, "SENTINEL_FRAME_RE"));

fn is_sentinel_frame(html: &str, caps: &Captures) -> bool {
    caps.name("attrs")
        .is_some_and(|attrs| SENTINEL_FRAME_RE.is_match(&html[attrs.start()..]))
}

/// Finds the `src` of every `<iframe>` tag except the `g_iFrame` sentinel.
pub fn extract_iframes(html: &str) -> Vec<RawCandidate> {
    captures_filtered(&IFRAME_RE, html, |caps| !is_sentinel_frame(html, caps))
        .filter_map(|caps| caps.name("url"))
        .map(|m| RawCandidate::new(m.as_str(), CandidateKind::Iframe))
        .collect()
}
