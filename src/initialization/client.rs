//! HTTP client initialization.
//!
//! This module builds the HTTP clients shared by the page fetcher and the
//! manifest parsers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use reqwest::ClientBuilder;

/// Initializes the HTTP client with default settings.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from config
/// - Timeout from config
/// - Redirect following enabled (reqwest default, up to 10 hops)
///
/// Used for manifest requests, where only the final body matters.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}

/// Initializes the HTTP client for page fetches.
///
/// Redirects are disabled so the fetcher can follow them manually and report
/// the full redirect chain.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_redirect_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clients_build_with_default_config() {
        let config = Config::default();
        assert!(init_client(&config).is_ok());
        assert!(init_redirect_client(&config).is_ok());
    }
}
