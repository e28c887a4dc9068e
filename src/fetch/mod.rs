//! Page fetching.
//!
//! The resolver only needs `(final_url, redirect_chain, body)` for a URL and a
//! set of request headers. [`PageFetcher`] is that seam; [`HttpFetcher`] is the
//! default implementation.

mod http;
mod redirects;
mod request;

use async_trait::async_trait;
use reqwest::header::HeaderMap;

use crate::error_handling::FetchError;

// Re-export public API
pub use http::HttpFetcher;
pub use redirects::follow_redirects;
pub use request::{alternate_headers, page_headers, stream_headers};

/// A fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// URL of the final, non-redirect response
    pub final_url: String,
    /// URLs that redirected before the final response, oldest first
    pub redirect_chain: Vec<String>,
    /// Decoded response body
    pub body: String,
}

/// Fetches page text.
///
/// Implementations report non-success statuses as [`FetchError::Status`] so
/// the resolver can tell terminal (403/404) from other failures.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` with the given request headers.
    async fn fetch(&self, url: &str, headers: &HeaderMap) -> Result<FetchedPage, FetchError>;
}
