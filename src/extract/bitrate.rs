//! Quality labels for progressive `.mp3`/`.mp4` streams.

use std::sync::LazyLock;

use regex::Regex;

use crate::utils::pattern::compile_regex_unsafe;

const BITRATE_PATTERN: &str =
    r"(?:_|\.|/|-)(?:(?P<bitrate>\d{1,4})k?|(?P<resolution>\d{1,4}p)(?:\.h26[45])?)\.mp[34]";

/// Bitrates that are really vertical resolutions
const COMMON_RESOLUTIONS: [&str; 8] = ["2160", "1440", "1080", "720", "576", "480", "360", "240"];

/// Label used when the URL carries no quality hint
pub const DEFAULT_HTTP_LABEL: &str = "vod";

static BITRATE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(BITRATE_PATTERN, "BITRATE_RE"));

/// Derives a quality label from a media file name.
///
/// `clip_720.mp4` is `720p`, `clip_1500k.mp4` is `1500k`, `clip.480p.h264.mp4`
/// is `480p`; anything else is [`DEFAULT_HTTP_LABEL`].
pub fn http_stream_label(url: &str) -> String {
    let Some(caps) = BITRATE_RE.captures(url) else {
        return DEFAULT_HTTP_LABEL.to_string();
    };
    if let Some(bitrate) = caps.name("bitrate") {
        let bitrate = bitrate.as_str();
        if COMMON_RESOLUTIONS.contains(&bitrate) {
            format!("{bitrate}p")
        } else {
            format!("{bitrate}k")
        }
    } else if let Some(resolution) = caps.name("resolution") {
        resolution.as_str().to_string()
    } else {
        DEFAULT_HTTP_LABEL.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_resolution_as_bitrate() {
        assert_eq!(http_stream_label("http://a.com/v/clip_720.mp4"), "720p");
        assert_eq!(http_stream_label("http://a.com/v/clip-1080k.mp4"), "1080p");
    }

    #[test]
    fn test_plain_bitrate() {
        assert_eq!(http_stream_label("http://a.com/v/clip_1500k.mp4"), "1500k");
        assert_eq!(http_stream_label("http://a.com/radio/128.mp3"), "128k");
    }

    #[test]
    fn test_resolution_with_codec() {
        assert_eq!(http_stream_label("http://a.com/v/clip.480p.h264.mp4"), "480p");
        assert_eq!(http_stream_label("http://a.com/v/clip_360p.mp4"), "360p");
    }

    #[test]
    fn test_default_label() {
        assert_eq!(http_stream_label("http://a.com/v/clip.mp4"), "vod");
        assert_eq!(http_stream_label("http://a.com/v/clip_12345.mp4"), "vod");
    }
}
