//! Protocol dispatch for accepted playlist URLs.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use log::{debug, error};
use url::Url;

use super::{
    DashParser, HlsParser, ManifestParser, StreamDescriptor, StreamKind, LIVE_LABEL,
};
use crate::config::Config;
use crate::error_handling::{InfoType, ResolutionStats};
use crate::extract::http_stream_label;
use crate::fetch::stream_headers;
use crate::filter::{is_origin_sensitive, netloc};
use crate::initialization::init_client;

/// Turns playlist URLs into stream descriptors, lazily.
///
/// At most `playlist_max` URLs are resolved per protocol; a URL whose
/// manifest cannot be fetched or parsed is logged and skipped and does not
/// count towards the cap.
#[derive(Clone)]
pub struct Dispatcher {
    hls: Arc<dyn ManifestParser>,
    dash: Arc<dyn ManifestParser>,
    playlist_max: usize,
}

/// Per-dispatch state threaded through the lazy stream.
struct DispatchState {
    dispatcher: Dispatcher,
    urls: std::vec::IntoIter<String>,
    pending: VecDeque<StreamDescriptor>,
    counts: HashMap<StreamKind, usize>,
    referer: String,
    origin: String,
    stats: Arc<ResolutionStats>,
}

impl Dispatcher {
    /// Creates a dispatcher from explicit parsers.
    pub fn new(
        hls: Arc<dyn ManifestParser>,
        dash: Arc<dyn ManifestParser>,
        playlist_max: usize,
    ) -> Self {
        Self {
            hls,
            dash,
            playlist_max,
        }
    }

    /// Creates a dispatcher with the default HLS and DASH parsers sharing one
    /// redirect-following client.
    ///
    /// # Errors
    ///
    /// Returns a `reqwest::Error` if client creation fails.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = init_client(config)?;
        Ok(Self::new(
            Arc::new(HlsParser::new(Arc::clone(&client))),
            Arc::new(DashParser::new(client)),
            config.playlist_max,
        ))
    }

    /// Resolves `urls` in order as the returned stream is polled.
    ///
    /// Every request and descriptor carries `Referer: referer`; URLs on
    /// origin-checking CDNs also carry an `Origin` built from `page_url`.
    pub fn dispatch(
        &self,
        urls: Vec<String>,
        page_url: &Url,
        referer: String,
        stats: Arc<ResolutionStats>,
    ) -> BoxStream<'static, StreamDescriptor> {
        let state = DispatchState {
            dispatcher: self.clone(),
            urls: urls.into_iter(),
            pending: VecDeque::new(),
            counts: HashMap::new(),
            referer,
            origin: format!("{}://{}", page_url.scheme(), netloc(page_url)),
            stats,
        };

        stream::unfold(state, |mut state| async move {
            loop {
                if let Some(descriptor) = state.pending.pop_front() {
                    return Some((descriptor, state));
                }
                let url = state.urls.next()?;
                state.resolve(&url).await;
            }
        })
        .boxed()
    }
}

impl DispatchState {
    async fn resolve(&mut self, url: &str) {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!("parsed URL - {} ({})", url, e);
                return;
            }
        };
        let Some(kind) = StreamKind::from_url(&parsed) else {
            error!("parsed URL - {}", url);
            return;
        };

        let count = self.counts.entry(kind).or_insert(0);
        if *count >= self.dispatcher.playlist_max {
            debug!("Skip - {}", url);
            self.stats.increment_info(InfoType::PlaylistCapReached);
            return;
        }

        let origin = is_origin_sensitive(&parsed).then_some(self.origin.as_str());
        let headers = stream_headers(&self.referer, origin);

        let parser = match kind {
            StreamKind::Hls => &self.dispatcher.hls,
            StreamKind::Dash => &self.dispatcher.dash,
            StreamKind::Http => {
                self.pending.push_back(
                    StreamDescriptor::new(http_stream_label(url), kind, url).with_headers(&headers),
                );
                debug!("HTTP URL - {}", url);
                *count += 1;
                return;
            }
        };

        match parser.parse(url, &headers).await {
            Ok(variants) => {
                if variants.is_empty() && kind == StreamKind::Hls {
                    self.pending.push_back(
                        StreamDescriptor::new(LIVE_LABEL, kind, url).with_headers(&headers),
                    );
                }
                for variant in variants {
                    self.pending.push_back(
                        StreamDescriptor::new(variant.label, kind, variant.url)
                            .with_headers(&headers),
                    );
                }
                debug!("{} URL - {}", kind.as_str().to_uppercase(), url);
                *self.counts.entry(kind).or_insert(0) += 1;
            }
            Err(e) => {
                error!("Skip {} with error {}", kind.as_str().to_uppercase(), e);
                self.stats.increment_info(InfoType::StreamSkipped);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::ManifestError;
    use crate::protocol::Variant;
    use async_trait::async_trait;
    use reqwest::header::HeaderMap;

    /// Returns fixed variants, or an error for URLs containing "broken".
    struct StubParser {
        variants: Vec<Variant>,
    }

    #[async_trait]
    impl ManifestParser for StubParser {
        async fn parse(&self, url: &str, _headers: &HeaderMap) -> Result<Vec<Variant>, ManifestError> {
            if url.contains("broken") {
                return Err(ManifestError::Parse {
                    url: url.to_string(),
                    reason: "stub".to_string(),
                });
            }
            Ok(self.variants.clone())
        }
    }

    fn dispatcher(hls_variants: Vec<Variant>, playlist_max: usize) -> Dispatcher {
        let dash = vec![Variant {
            label: "720p".to_string(),
            url: "https://a.com/m.mpd".to_string(),
        }];
        Dispatcher::new(
            Arc::new(StubParser {
                variants: hls_variants,
            }),
            Arc::new(StubParser { variants: dash }),
            playlist_max,
        )
    }

    async fn collect(dispatcher: &Dispatcher, urls: &[&str], page: &str) -> Vec<StreamDescriptor> {
        let urls = urls.iter().map(|u| u.to_string()).collect();
        dispatcher
            .dispatch(
                urls,
                &Url::parse(page).unwrap(),
                page.to_string(),
                Arc::new(ResolutionStats::new()),
            )
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_hls_without_variants_is_live() {
        let streams = collect(&dispatcher(vec![], 5), &["https://cdn.com/i.m3u8"], "https://p.com/").await;
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].label, "live");
        assert_eq!(streams[0].kind, StreamKind::Hls);
        assert_eq!(streams[0].headers.get("referer").unwrap(), "https://p.com/");
    }

    #[tokio::test]
    async fn test_http_label_and_dash_variants() {
        let streams = collect(
            &dispatcher(vec![], 5),
            &["https://cdn.com/clip_720.mp4", "https://cdn.com/m.mpd"],
            "https://p.com/",
        )
        .await;
        let labels: Vec<(&str, StreamKind)> =
            streams.iter().map(|s| (s.label.as_str(), s.kind)).collect();
        assert_eq!(labels, vec![("720p", StreamKind::Http), ("720p", StreamKind::Dash)]);
    }

    #[tokio::test]
    async fn test_cap_per_protocol() {
        let urls = ["https://c.com/1.mp4", "https://c.com/2.mp4", "https://c.com/3.mp4", "https://c.com/a.m3u8"];
        let streams = collect(&dispatcher(vec![], 2), &urls, "https://p.com/").await;
        let urls: Vec<&str> = streams.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, vec!["https://c.com/1.mp4", "https://c.com/2.mp4", "https://c.com/a.m3u8"]);
    }

    #[tokio::test]
    async fn test_failed_manifest_is_skipped() {
        let variants = vec![Variant {
            label: "1080p".to_string(),
            url: "https://c.com/hd.m3u8".to_string(),
        }];
        let streams = collect(
            &dispatcher(variants, 5),
            &["https://c.com/broken.m3u8", "https://c.com/ok.m3u8"],
            "https://p.com/",
        )
        .await;
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].label, "1080p");
    }

    #[tokio::test]
    async fn test_origin_header_for_cloudfront() {
        let streams = collect(
            &dispatcher(vec![], 5),
            &["https://d1.cloudfront.net/v.mp4", "https://cdn.com/v.mp4"],
            "https://page.example.com/watch?v=1",
        )
        .await;
        assert_eq!(
            streams[0].headers.get("origin").map(String::as_str),
            Some("https://page.example.com")
        );
        assert!(!streams[1].headers.contains_key("origin"));
    }
}
