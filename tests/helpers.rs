//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::StreamExt;
use stream_resolver::{
    Config, FallbackOutput, FallbackResolver, IframeChooser, Resolution, StreamDescriptor,
};
use stream_resolver::error_handling::FallbackError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config with a short timeout for tests.
pub fn test_config() -> Config {
    Config {
        timeout_seconds: 5,
        ..Default::default()
    }
}

/// Serves `body` as HTML at `route`.
pub async fn mount_page(server: &MockServer, route: &str, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(body.into()),
        )
        .mount(server)
        .await;
}

/// Serves `body` as an HLS playlist at `route`.
pub async fn mount_playlist(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/vnd.apple.mpegurl")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

pub async fn collect(resolution: Resolution) -> Vec<StreamDescriptor> {
    resolution.streams.collect().await
}

/// Fallback returning a fixed output and counting its calls.
pub struct StubFallback {
    pub output: FallbackOutput,
    pub calls: AtomicUsize,
}

impl StubFallback {
    pub fn new(output: FallbackOutput) -> Self {
        Self {
            output,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FallbackResolver for StubFallback {
    async fn resolve(&self, _url: &str) -> Result<FallbackOutput, FallbackError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}

/// Chooser that counts how often it was asked and always answers `answer`.
pub struct CountingChooser {
    pub answer: &'static str,
    pub asked: AtomicUsize,
}

impl CountingChooser {
    pub fn new(answer: &'static str) -> Self {
        Self {
            answer,
            asked: AtomicUsize::new(0),
        }
    }

    pub fn asked(&self) -> usize {
        self.asked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IframeChooser for CountingChooser {
    async fn choose(&self, _candidates: &[String]) -> Option<String> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        Some(self.answer.to_string())
    }
}
