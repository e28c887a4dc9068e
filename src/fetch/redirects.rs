//! HTTP redirect chain resolution.
//!
//! Redirects are followed manually so every hop can be logged and reported
//! back to the resolver.

use reqwest::header::HeaderMap;
use reqwest::{Response, Url};

use crate::error_handling::FetchError;

/// Sends `GET start_url` and follows redirects up to `max_hops` times.
///
/// Returns the final, non-redirect response and the URLs that redirected
/// on the way, oldest first.
///
/// # Errors
///
/// Returns a `FetchError` if a request fails, a `Location` header cannot be
/// resolved, or the chain is longer than `max_hops`.
pub async fn follow_redirects(
    client: &reqwest::Client,
    start_url: &str,
    headers: &HeaderMap,
    max_hops: usize,
) -> Result<(Response, Vec<String>), FetchError> {
    let mut chain: Vec<String> = Vec::new();
    let mut current = Url::parse(start_url)?;

    loop {
        let resp = client
            .get(current.clone())
            .headers(headers.clone())
            .send()
            .await?;

        let status_code = resp.status().as_u16();
        if !matches!(status_code, 301 | 302 | 303 | 307 | 308) {
            return Ok((resp, chain));
        }
        let Some(loc) = resp.headers().get(reqwest::header::LOCATION) else {
            // Redirect status but no Location header: treat as final
            log::warn!(
                "Redirect status {} for {} but no Location header",
                status_code,
                current
            );
            return Ok((resp, chain));
        };
        let loc = loc.to_str().unwrap_or("").to_string();
        let next = current.join(&loc)?;

        log::debug!("Redirect: {} - {}", status_code, current);
        chain.push(current.to_string());
        if chain.len() > max_hops {
            return Err(FetchError::TooManyRedirects(start_url.to_string()));
        }
        current = next;
    }
}
