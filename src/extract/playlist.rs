//! Playlist and media file URL extraction.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{CandidateKind, RawCandidate};
use crate::utils::pattern::{captures_filtered, compile_regex_unsafe};

// Opening delimiter, URL ending in a media extension with an optional query,
// optional trailing slash, closing delimiter.
const PLAYLIST_PATTERN: &str = r#"(?s)(?:["']|=|&quot;)(?P<url>[^"'<>\s;{}]+\.(?:m3u8|mp3|mp4|mpd)(?:\?[^"'<>\s\\{}]+)?)/?(?P<end>\\?["']|\s|>|\\&quot;)"#;
const QUOTES: &[char] = &['"', '\''];

static PLAYLIST_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(PLAYLIST_PATTERN, "PLAYLIST_RE"));

/// True if `prefix` ends with `title="` or `"title":"` (either quote).
fn follows_title(prefix: &str) -> bool {
    let Some(rest) = prefix.strip_suffix(QUOTES) else {
        return false;
    };
    if rest.ends_with("title=") {
        return true;
    }
    rest.strip_suffix(':')
        .and_then(|rest| rest.strip_suffix(QUOTES))
        .and_then(|rest| rest.strip_suffix("title"))
        .is_some_and(|rest| rest.ends_with(QUOTES))
}

fn is_media_url(html: &str, caps: &Captures) -> bool {
    let (Some(url), Some(end)) = (caps.name("url"), caps.name("end")) else {
        return false;
    };
    if follows_title(&html[..url.start()]) {
        return false;
    }
    // whitespace does not terminate a URL directly after ';'
    if end.as_str().starts_with(char::is_whitespace) && html[..end.start()].ends_with(';') {
        return false;
    }
    true
}

/// Finds quoted or entity-delimited URLs ending in `.m3u8`, `.mp3`, `.mp4`
/// or `.mpd`, in page order, duplicates included.
pub fn extract_playlists(html: &str) -> Vec<RawCandidate> {
    captures_filtered(&PLAYLIST_RE, html, |caps| is_media_url(html, caps))
        .filter_map(|caps| caps.name("url"))
        .map(|m| RawCandidate::new(m.as_str(), CandidateKind::Playlist))
        .collect()
}
