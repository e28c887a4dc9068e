//! DASH manifest parsing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::header::HeaderMap;

use super::{dedup_labels, fetch_manifest, ManifestParser, Variant};
use crate::error_handling::ManifestError;

/// Lists the representations of an MPD with `quick-xml`.
///
/// Video representations are labelled by height (`720p`), audio ones by
/// bandwidth (`a128k`). Every variant points at the manifest itself.
#[derive(Debug, Clone)]
pub struct DashParser {
    client: Arc<reqwest::Client>,
}

impl DashParser {
    /// Creates a parser that fetches manifests with `client`.
    pub fn new(client: Arc<reqwest::Client>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentType {
    Video,
    Audio,
    Other,
}

impl ContentType {
    fn from_attr(value: &str) -> Self {
        if value.starts_with("video") {
            ContentType::Video
        } else if value.starts_with("audio") {
            ContentType::Audio
        } else {
            ContentType::Other
        }
    }
}

/// Parse XML attributes into a HashMap keyed by local name
fn parse_attributes(element: &BytesStart) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    for attr in element.attributes().flatten() {
        if let (Ok(key), Ok(value)) = (
            std::str::from_utf8(attr.key.local_name().as_ref()),
            std::str::from_utf8(&attr.value),
        ) {
            attrs.insert(key.to_string(), value.to_string());
        }
    }
    attrs
}

fn content_type(attrs: &HashMap<String, String>) -> Option<ContentType> {
    attrs
        .get("contentType")
        .or_else(|| attrs.get("mimeType"))
        .map(|value| ContentType::from_attr(value))
}

fn representation_label(attrs: &HashMap<String, String>, content: ContentType) -> Option<String> {
    let kbps = attrs
        .get("bandwidth")
        .and_then(|bandwidth| bandwidth.parse::<u64>().ok())
        .map(|bandwidth| bandwidth / 1000);
    match content {
        ContentType::Video => attrs
            .get("height")
            .map(|height| format!("{height}p"))
            .or_else(|| kbps.map(|kbps| format!("{kbps}k"))),
        ContentType::Audio => kbps.map(|kbps| format!("a{kbps}k")),
        ContentType::Other => None,
    }
}

/// Parses an MPD body fetched from `url`.
pub(crate) fn parse_mpd(url: &str, body: &str) -> Result<Vec<Variant>, ManifestError> {
    let parse_error = |reason: String| ManifestError::Parse {
        url: url.to_string(),
        reason,
    };

    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut seen_mpd = false;
    let mut set_content: Option<ContentType> = None;
    let mut variants = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                match e.local_name().as_ref() {
                    b"MPD" => seen_mpd = true,
                    b"AdaptationSet" => set_content = content_type(&parse_attributes(e)),
                    b"Representation" => {
                        let attrs = parse_attributes(e);
                        let content = content_type(&attrs)
                            .or(set_content)
                            .unwrap_or(ContentType::Other);
                        if let Some(label) = representation_label(&attrs, content) {
                            variants.push(Variant {
                                label,
                                url: url.to_string(),
                            });
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"AdaptationSet" => {
                set_content = None;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(parse_error(e.to_string())),
        }
    }

    if !seen_mpd {
        return Err(parse_error("missing MPD element".to_string()));
    }
    dedup_labels(variants.iter_mut().map(|variant| &mut variant.label));
    Ok(variants)
}

#[async_trait]
impl ManifestParser for DashParser {
    async fn parse(&self, url: &str, headers: &HeaderMap) -> Result<Vec<Variant>, ManifestError> {
        let bytes = fetch_manifest(&self.client, url, headers).await?;
        let body = String::from_utf8_lossy(&bytes);
        parse_mpd(url, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MPD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<MPD xmlns="urn:mpeg:dash:schema:mpd:2011" type="static" mediaPresentationDuration="PT60S">
  <Period>
    <AdaptationSet contentType="video" mimeType="video/mp4">
      <Representation id="v1" bandwidth="3000000" width="1920" height="1080"/>
      <Representation id="v2" bandwidth="1200000" width="1280" height="720"/>
    </AdaptationSet>
    <AdaptationSet mimeType="audio/mp4" lang="en">
      <Representation id="a1" bandwidth="128000"/>
    </AdaptationSet>
    <AdaptationSet mimeType="text/vtt">
      <Representation id="t1" bandwidth="100"/>
    </AdaptationSet>
  </Period>
</MPD>"#;

    #[test]
    fn test_representations() {
        let variants = parse_mpd("https://cdn.example.com/v/manifest.mpd", MPD).unwrap();
        let labels: Vec<&str> = variants.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(labels, vec!["1080p", "720p", "a128k"]);
        assert!(variants
            .iter()
            .all(|v| v.url == "https://cdn.example.com/v/manifest.mpd"));
    }

    #[test]
    fn test_representation_mime_type_overrides_set() {
        let mpd = r#"<MPD><Period><AdaptationSet>
<Representation mimeType="video/mp4" bandwidth="500000"/>
<Representation mimeType="audio/mp4" bandwidth="96000"/>
</AdaptationSet></Period></MPD>"#;
        let variants = parse_mpd("https://a.com/m.mpd", mpd).unwrap();
        let labels: Vec<&str> = variants.iter().map(|v| v.label.as_str()).collect();
        assert_eq!(labels, vec!["500k", "a96k"]);
    }

    #[test]
    fn test_not_an_mpd() {
        assert!(matches!(
            parse_mpd("https://a.com/m.mpd", "<html><body/></html>"),
            Err(ManifestError::Parse { .. })
        ));
    }
}
