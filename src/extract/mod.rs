//! Candidate extraction from deobfuscated HTML.
//!
//! This module provides:
//! - Playlist, iframe and script-redirect candidate extraction
//! - Bitrate/resolution labels for progressive HTTP streams
//! - Page title and author metadata

mod bitrate;
mod iframe;
mod metadata;
mod playlist;
mod redirect;

// Re-export public API
pub use bitrate::http_stream_label;
pub use iframe::extract_iframes;
pub use metadata::{page_author, page_title};
pub use playlist::extract_playlists;
pub use redirect::extract_window_location;

/// Where a candidate URL was found on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateKind {
    /// `src` of an `<iframe>`
    Iframe,
    /// Quoted media URL (`.m3u8`, `.mp3`, `.mp4`, `.mpd`)
    Playlist,
    /// Target of `window.location.href = "..."`
    Redirect,
}

impl CandidateKind {
    /// Returns the string representation used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateKind::Iframe => "iframe",
            CandidateKind::Playlist => "playlist",
            CandidateKind::Redirect => "redirect",
        }
    }
}

/// A URL fragment exactly as matched in the page, before repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCandidate {
    /// Matched text
    pub url: String,
    /// Extraction pattern that produced it
    pub kind: CandidateKind,
}

impl RawCandidate {
    pub(crate) fn new(url: impl Into<String>, kind: CandidateKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }
}
