//! `yt-dlp` fallback.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, trace};
use serde::Deserialize;
use tokio::process::Command;

use super::{FallbackOutput, FallbackResolver};
use crate::config::{Config, FALLBACK_TIMEOUT_SECS};
use crate::error_handling::FallbackError;
use crate::protocol::{dedup_labels, StreamDescriptor, StreamKind};

/// Runs `yt-dlp --dump-json --no-playlist <url>` and maps its formats.
#[derive(Debug, Clone)]
pub struct YtDlpResolver {
    program: String,
    timeout: Duration,
}

impl YtDlpResolver {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Uses the configured executable and the default time limit.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.ytdlp_path.clone(),
            Duration::from_secs(FALLBACK_TIMEOUT_SECS),
        )
    }
}

/// The subset of the `--dump-json` document that is used.
#[derive(Debug, Deserialize)]
pub(crate) struct VideoInfo {
    title: Option<String>,
    formats: Option<Vec<Format>>,
    requested_formats: Option<Vec<Format>>,
}

#[derive(Debug, Deserialize)]
struct Format {
    url: Option<String>,
    manifest_url: Option<String>,
    protocol: Option<String>,
    vcodec: Option<String>,
    acodec: Option<String>,
    height: Option<u64>,
    ext: Option<String>,
    #[serde(default)]
    http_headers: BTreeMap<String, String>,
}

fn has_codec(codec: &Option<String>) -> bool {
    codec.as_deref().is_some_and(|codec| codec != "none")
}

impl Format {
    fn kind(&self) -> StreamKind {
        match self.protocol.as_deref() {
            Some("m3u8") | Some("m3u8_native") => StreamKind::Hls,
            _ => StreamKind::Http,
        }
    }

    fn descriptor(&self, label: String, url: &str) -> StreamDescriptor {
        StreamDescriptor {
            label,
            kind: self.kind(),
            url: url.to_string(),
            headers: self.http_headers.clone(),
        }
    }
}

/// Maps a `yt-dlp` info document to descriptors and manifest URLs.
///
/// Formats with both codecs are labelled by height, audio-only ones by
/// container. Video-only formats need muxing and are left out. Manifests
/// from `requested_formats` are used only when `formats` is empty.
pub(crate) fn map_info(info: VideoInfo) -> FallbackOutput {
    let formats = info.formats.unwrap_or_default();
    let mut streams = Vec::new();

    for format in &formats {
        let Some(url) = format.url.as_deref() else {
            continue;
        };
        let video = has_codec(&format.vcodec);
        let audio = has_codec(&format.acodec);
        if video && audio {
            let height = format
                .height
                .map_or_else(|| "unknown".to_string(), |height| height.to_string());
            streams.push(format.descriptor(format!("{height}p"), url));
        } else if audio {
            let ext = format.ext.as_deref().unwrap_or("unknown");
            streams.push(format.descriptor(format!("audio_{ext}"), url));
        } else if video {
            trace!("Skip video-only format {}", url);
        }
    }
    dedup_labels(streams.iter_mut().map(|stream| &mut stream.label));

    let manifests = if formats.is_empty() {
        info.requested_formats
            .unwrap_or_default()
            .into_iter()
            .filter_map(|format| format.manifest_url)
            .filter(|url| url.ends_with(".m3u8") || url.ends_with(".mpd"))
            .collect()
    } else {
        Vec::new()
    };

    FallbackOutput {
        title: info.title,
        streams,
        manifests,
    }
}

#[async_trait]
impl FallbackResolver for YtDlpResolver {
    async fn resolve(&self, url: &str) -> Result<FallbackOutput, FallbackError> {
        debug!("Fallback {}", self.program);
        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.program)
                .args(["--dump-json", "--no-warnings", "--no-playlist", url])
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| FallbackError::Timeout(self.timeout.as_secs()))??;

        if !output.status.success() {
            return Err(FallbackError::Exit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let info: VideoInfo = serde_json::from_slice(&output.stdout)?;
        let mapped = map_info(info);
        debug!(
            "Fallback streams: {}, manifests: {}",
            mapped.streams.len(),
            mapped.manifests.len()
        );
        Ok(mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(json: &str) -> FallbackOutput {
        map_info(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_muxed_and_audio_formats() {
        let output = map(
            r#"{
            "title": "Concert",
            "formats": [
                {"url": "https://v.example.com/a.m4a", "acodec": "mp4a.40.2", "vcodec": "none", "ext": "m4a"},
                {"url": "https://v.example.com/v.mp4", "acodec": "none", "vcodec": "avc1", "height": 1080},
                {"url": "https://v.example.com/360.mp4", "acodec": "mp4a", "vcodec": "avc1", "height": 360,
                 "protocol": "https", "http_headers": {"User-Agent": "yt"}},
                {"url": "https://v.example.com/720.m3u8", "acodec": "mp4a", "vcodec": "avc1", "height": 720,
                 "protocol": "m3u8_native"}
            ]
        }"#,
        );
        assert_eq!(output.title.as_deref(), Some("Concert"));
        let streams: Vec<(&str, StreamKind)> = output
            .streams
            .iter()
            .map(|s| (s.label.as_str(), s.kind))
            .collect();
        assert_eq!(
            streams,
            vec![
                ("audio_m4a", StreamKind::Http),
                ("360p", StreamKind::Http),
                ("720p", StreamKind::Hls),
            ]
        );
        assert_eq!(output.streams[1].headers.get("User-Agent").unwrap(), "yt");
        assert!(output.manifests.is_empty());
    }

    #[test]
    fn test_duplicate_labels() {
        let output = map(
            r#"{"formats": [
                {"url": "https://a/1", "acodec": "mp4a", "vcodec": "avc1", "height": 480},
                {"url": "https://a/2", "acodec": "mp4a", "vcodec": "vp9", "height": 480}
            ]}"#,
        );
        let labels: Vec<&str> = output.streams.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["480p", "480p_alt"]);
    }

    #[test]
    fn test_requested_format_manifests() {
        let output = map(
            r#"{"title": "Live", "formats": null, "requested_formats": [
                {"manifest_url": "https://m.example.com/master.m3u8"},
                {"manifest_url": "https://m.example.com/manifest.mpd"},
                {"manifest_url": "https://m.example.com/other.ism"}
            ]}"#,
        );
        assert!(output.streams.is_empty());
        assert_eq!(
            output.manifests,
            vec![
                "https://m.example.com/master.m3u8",
                "https://m.example.com/manifest.mpd"
            ]
        );
    }

    #[test]
    fn test_empty_document() {
        assert!(map("{}").is_empty());
    }

    #[tokio::test]
    async fn test_missing_executable_is_io_error() {
        let resolver = YtDlpResolver::new(
            "stream-resolver-no-such-binary",
            Duration::from_secs(5),
        );
        let err = resolver.resolve("https://example.com/").await.unwrap_err();
        assert!(matches!(err, FallbackError::Io(_)));
    }
}
