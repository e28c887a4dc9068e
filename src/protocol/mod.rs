//! Stream protocols and the dispatcher.
//!
//! This module provides:
//! - [`StreamKind`], chosen from the URL file extension
//! - [`StreamDescriptor`], the final output of a resolution
//! - The [`ManifestParser`] seam with HLS and DASH implementations
//! - [`Dispatcher`], which turns accepted playlist URLs into descriptors

mod dash;
mod dispatch;
mod hls;

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::Serialize;
use strum_macros::EnumIter;
use url::Url;

use crate::error_handling::{FetchError, ManifestError};

// Re-export public API
pub use dash::DashParser;
pub use dispatch::Dispatcher;
pub use hls::HlsParser;

/// Label of an HLS stream whose playlist lists no variants.
pub const LIVE_LABEL: &str = "live";

/// Stream protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    /// HTTP Live Streaming (`.m3u8`)
    Hls,
    /// MPEG-DASH (`.mpd`)
    Dash,
    /// Progressive download (`.mp3`, `.mp4`)
    Http,
}

impl StreamKind {
    /// Picks the protocol from the extension at the end of the URL path or
    /// query.
    pub fn from_url(url: &Url) -> Option<Self> {
        let path = url.path();
        let query = url.query().unwrap_or("");
        let ends_with = |ext: &str| path.ends_with(ext) || query.ends_with(ext);
        if ends_with(".m3u8") {
            Some(StreamKind::Hls)
        } else if ends_with(".mp3") || ends_with(".mp4") {
            Some(StreamKind::Http)
        } else if ends_with(".mpd") {
            Some(StreamKind::Dash)
        } else {
            None
        }
    }

    /// Returns the string representation of the stream kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Hls => "hls",
            StreamKind::Dash => "dash",
            StreamKind::Http => "http",
        }
    }
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One playable stream variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamDescriptor {
    /// Quality or format tag (`720p`, `1500k`, `live`, `audio_m4a`, ...)
    pub label: String,
    /// Protocol
    pub kind: StreamKind,
    /// Stream or manifest URL
    pub url: String,
    /// Request headers the stream must be opened with
    pub headers: BTreeMap<String, String>,
}

impl StreamDescriptor {
    /// Creates a descriptor without headers.
    pub fn new(label: impl Into<String>, kind: StreamKind, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind,
            url: url.into(),
            headers: BTreeMap::new(),
        }
    }

    /// Sets the request headers, skipping values that are not valid strings.
    pub fn with_headers(mut self, headers: &HeaderMap) -> Self {
        self.headers = headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        self
    }
}

/// A named rendition listed in a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Quality label
    pub label: String,
    /// URL the rendition is played from
    pub url: String,
}

/// Parses a stream manifest into its renditions.
#[async_trait]
pub trait ManifestParser: Send + Sync {
    /// Fetches and parses the manifest at `url`.
    ///
    /// An empty result means the manifest is valid but lists no renditions.
    async fn parse(&self, url: &str, headers: &HeaderMap) -> Result<Vec<Variant>, ManifestError>;
}

/// Fetches a manifest body.
pub(crate) async fn fetch_manifest(
    client: &reqwest::Client,
    url: &str,
    headers: &HeaderMap,
) -> Result<Vec<u8>, ManifestError> {
    let response = client
        .get(url)
        .headers(headers.clone())
        .send()
        .await
        .map_err(FetchError::from)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        }
        .into());
    }
    let body = response.bytes().await.map_err(FetchError::from)?;
    Ok(body.to_vec())
}

/// Appends `_alt`, `_alt2`, ... to labels already used earlier in the list.
pub(crate) fn dedup_labels<'a>(labels: impl IntoIterator<Item = &'a mut String>) {
    let mut used: Vec<String> = Vec::new();
    for label in labels {
        let base = label.clone();
        let mut candidate = base.clone();
        let mut n = 1;
        while used.contains(&candidate) {
            candidate = if n == 1 {
                format!("{base}_alt")
            } else {
                format!("{base}_alt{n}")
            };
            n += 1;
        }
        used.push(candidate.clone());
        *label = candidate;
    }
}
