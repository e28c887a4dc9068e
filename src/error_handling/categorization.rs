//! Error categorization and retry strategy.
//!
//! This module decides what the orchestrator does with a failed fetch and
//! configures the retry strategy used by the fetch state.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::FetchError;
use crate::config::{HTTP_STATUS_FORBIDDEN, HTTP_STATUS_NOT_FOUND, HTTP_STATUS_TOO_MANY_REQUESTS};

/// What a failed fetch means for the current resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailure {
    /// 403/404: this URL has no streams, do not retry.
    NoStreams,
    /// The body could not be decoded; retry once with the alternate headers.
    ContentEncoding,
    /// Timeouts, connection failures, 5xx and 429.
    Transient,
    /// Anything else.
    Fatal,
}

/// Creates an exponential backoff retry strategy.
///
/// Returns a retry strategy configured with:
/// - Initial delay: `RETRY_INITIAL_DELAY_MS` milliseconds
/// - Backoff factor: `RETRY_FACTOR`
/// - Maximum delay: `RETRY_MAX_DELAY_SECS` seconds
/// - Maximum retries: `RETRY_MAX_ATTEMPTS`
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(crate::config::RETRY_MAX_ATTEMPTS)
}

/// Categorizes a `FetchError`.
pub fn categorize_fetch_error(error: &FetchError) -> FetchFailure {
    match error {
        FetchError::Status { status, .. } => categorize_status(*status),
        FetchError::Request(err) => {
            if let Some(status) = err.status() {
                return categorize_status(status.as_u16());
            }
            if err.is_decode() || err.is_body() {
                FetchFailure::ContentEncoding
            } else if err.is_timeout() || err.is_connect() || err.is_request() {
                FetchFailure::Transient
            } else {
                FetchFailure::Fatal
            }
        }
        FetchError::InvalidUrl(_) | FetchError::TooManyRedirects(_) => FetchFailure::Fatal,
    }
}

fn categorize_status(status: u16) -> FetchFailure {
    match status {
        HTTP_STATUS_FORBIDDEN | HTTP_STATUS_NOT_FOUND => FetchFailure::NoStreams,
        HTTP_STATUS_TOO_MANY_REQUESTS => FetchFailure::Transient,
        500..=599 => FetchFailure::Transient,
        _ => FetchFailure::Fatal,
    }
}

/// Determines if a fetch error is worth retrying with backoff.
pub fn is_retriable_error(error: &FetchError) -> bool {
    categorize_fetch_error(error) == FetchFailure::Transient
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> FetchError {
        FetchError::Status {
            status: code,
            url: "http://example.com/".to_string(),
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert_eq!(categorize_fetch_error(&status(403)), FetchFailure::NoStreams);
        assert_eq!(categorize_fetch_error(&status(404)), FetchFailure::NoStreams);
        assert!(!is_retriable_error(&status(404)));
    }

    #[test]
    fn test_transient_statuses() {
        assert!(is_retriable_error(&status(429)));
        assert!(is_retriable_error(&status(500)));
        assert!(is_retriable_error(&status(503)));
    }

    #[test]
    fn test_other_client_errors_are_fatal() {
        assert_eq!(categorize_fetch_error(&status(400)), FetchFailure::Fatal);
        assert_eq!(categorize_fetch_error(&status(410)), FetchFailure::Fatal);
    }

    #[test]
    fn test_invalid_url_is_fatal() {
        let err = FetchError::from(url::Url::parse("http://").unwrap_err());
        assert_eq!(categorize_fetch_error(&err), FetchFailure::Fatal);
    }

    #[test]
    fn test_get_retry_strategy_max_attempts() {
        assert_eq!(
            get_retry_strategy().count(),
            crate::config::RETRY_MAX_ATTEMPTS
        );
    }

    #[test]
    fn test_get_retry_strategy_max_delay() {
        let max_delay_ms = crate::config::RETRY_MAX_DELAY_SECS * 1000;
        for delay in get_retry_strategy() {
            assert!(delay.as_millis() <= max_delay_ms as u128);
        }
    }
}
