//! Default page fetcher over `reqwest`.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use tokio_retry::RetryIf;

use super::redirects::follow_redirects;
use super::{FetchedPage, PageFetcher};
use crate::config::{Config, MAX_REDIRECT_HOPS};
use crate::error_handling::{get_retry_strategy, is_retriable_error, FetchError};
use crate::initialization::init_redirect_client;

/// Fetches pages with a redirect-disabled client, following redirects
/// manually and retrying transient failures with exponential backoff.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Arc<reqwest::Client>,
    max_hops: usize,
}

impl HttpFetcher {
    /// Wraps a client built with redirects disabled.
    pub fn new(client: Arc<reqwest::Client>) -> Self {
        Self {
            client,
            max_hops: MAX_REDIRECT_HOPS,
        }
    }

    /// Builds the client from the configured timeout and User-Agent.
    ///
    /// # Errors
    ///
    /// Returns a `reqwest::Error` if client creation fails.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(init_redirect_client(config)?))
    }

    async fn fetch_once(&self, url: &str, headers: &HeaderMap) -> Result<FetchedPage, FetchError> {
        let (response, redirect_chain) =
            follow_redirects(&self.client, url, headers, self.max_hops).await?;

        let final_url = response.url().to_string();
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: final_url,
            });
        }
        if !redirect_chain.is_empty() {
            log::debug!("URL: {}", final_url);
        }

        let body = response.text().await?;
        Ok(FetchedPage {
            final_url,
            redirect_chain,
            body,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, headers: &HeaderMap) -> Result<FetchedPage, FetchError> {
        RetryIf::spawn(
            get_retry_strategy(),
            || self.fetch_once(url, headers),
            is_retriable_error,
        )
        .await
    }
}
