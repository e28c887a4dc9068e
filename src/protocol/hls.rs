//! HLS variant playlist parsing.

use std::sync::Arc;

use async_trait::async_trait;
use m3u8_rs::{MasterPlaylist, Playlist};
use reqwest::header::HeaderMap;
use url::Url;

use super::{dedup_labels, fetch_manifest, ManifestParser, Variant};
use crate::error_handling::ManifestError;

/// Parses HLS playlists with `m3u8-rs`.
///
/// A master playlist yields one variant per `#EXT-X-STREAM-INF`, labelled
/// by height (`720p`) or, without a resolution, by bandwidth (`1500k`). A
/// media playlist yields no variants.
#[derive(Debug, Clone)]
pub struct HlsParser {
    client: Arc<reqwest::Client>,
}

impl HlsParser {
    /// Creates a parser that fetches playlists with `client`.
    pub fn new(client: Arc<reqwest::Client>) -> Self {
        Self { client }
    }
}

fn parse_error(url: &str, reason: impl ToString) -> ManifestError {
    ManifestError::Parse {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

/// Variants of a master playlist, with URIs resolved against `base`.
pub(crate) fn master_variants(playlist: &MasterPlaylist, base: &Url) -> Vec<Variant> {
    let mut variants: Vec<Variant> = playlist
        .variants
        .iter()
        .filter(|variant| !variant.is_i_frame)
        .filter_map(|variant| {
            let url = base.join(&variant.uri).ok()?;
            let label = match &variant.resolution {
                Some(resolution) => format!("{}p", resolution.height),
                None => format!("{}k", variant.bandwidth / 1000),
            };
            Some(Variant {
                label,
                url: url.to_string(),
            })
        })
        .collect();
    dedup_labels(variants.iter_mut().map(|variant| &mut variant.label));
    variants
}

/// Parses playlist bytes fetched from `url`.
pub(crate) fn parse_playlist(url: &str, bytes: &[u8]) -> Result<Vec<Variant>, ManifestError> {
    let base = Url::parse(url).map_err(|e| parse_error(url, e))?;
    match m3u8_rs::parse_playlist_res(bytes) {
        Ok(Playlist::MasterPlaylist(playlist)) => Ok(master_variants(&playlist, &base)),
        Ok(Playlist::MediaPlaylist(_)) => Ok(Vec::new()),
        Err(e) => Err(parse_error(url, e)),
    }
}

#[async_trait]
impl ManifestParser for HlsParser {
    async fn parse(&self, url: &str, headers: &HeaderMap) -> Result<Vec<Variant>, ManifestError> {
        let bytes = fetch_manifest(&self.client, url, headers).await?;
        parse_playlist(url, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "#EXTM3U
#EXT-X-STREAM-INF:BANDWIDTH=2500000,RESOLUTION=1280x720
hd/index.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360
https://other.example.com/sd/index.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=64000,CODECS=\"mp4a.40.2\"
audio/index.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=2000000,RESOLUTION=1280x720
hd2/index.m3u8
";

    const MEDIA: &str = "#EXTM3U
#EXT-X-TARGETDURATION:6
#EXT-X-MEDIA-SEQUENCE:1
#EXTINF:6.0,
seg1.ts
#EXTINF:6.0,
seg2.ts
";

    #[test]
    fn test_master_playlist_variants() {
        let variants =
            parse_playlist("https://cdn.example.com/live/master.m3u8", MASTER.as_bytes()).unwrap();
        let pairs: Vec<(&str, &str)> = variants
            .iter()
            .map(|v| (v.label.as_str(), v.url.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("720p", "https://cdn.example.com/live/hd/index.m3u8"),
                ("360p", "https://other.example.com/sd/index.m3u8"),
                ("64k", "https://cdn.example.com/live/audio/index.m3u8"),
                ("720p_alt", "https://cdn.example.com/live/hd2/index.m3u8"),
            ]
        );
    }

    #[test]
    fn test_media_playlist_has_no_variants() {
        let variants =
            parse_playlist("https://cdn.example.com/live/index.m3u8", MEDIA.as_bytes()).unwrap();
        assert!(variants.is_empty());
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let err = parse_playlist("https://cdn.example.com/x.m3u8", b"<html>nope</html>").unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }
}
