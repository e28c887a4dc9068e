//! Error type definitions.
//!
//! This module defines every error type surfaced by the resolver together with
//! the reason codes used when candidates are rejected.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Failure to convert a packed symbol back into an integer.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UnbaseError {
    /// Only bases 2-62 and 95 have an alphabet.
    #[error("Unsupported base encoding: {0}")]
    UnsupportedBase(u32),

    /// The digit is not part of the alphabet of this base.
    #[error("Invalid digit {digit:?} for base {base}")]
    InvalidDigit { digit: char, base: u32 },

    #[error("Empty digit string")]
    Empty,

    /// The value does not fit in 64 bits.
    #[error("Value {0:?} overflows")]
    Overflow(String),
}

/// Failure of a single deobfuscation stage on a single match.
///
/// These never escape `deobfuscate`; the stage leaves the text untouched.
#[derive(Error, Debug)]
pub enum UnpackError {
    /// The packed call could not be split into payload, radix, count and symbol table.
    #[error("Could not make sense of packer arguments")]
    MalformedArguments,

    /// `count` disagrees with the number of symbols.
    #[error("Malformed symbol table: expected {expected} symbols, found {found}")]
    SymbolCount { expected: usize, found: usize },

    #[error(transparent)]
    Unbase(#[from] UnbaseError),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A decoded obfuscator chunk held no usable code point.
    #[error("Invalid obfuscated chunk: {0}")]
    InvalidChunk(String),
}

/// Error types for page and manifest fetches.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Transport, timeout, or body decoding failure.
    #[error("HTTP request error: {0}")]
    Request(#[from] ReqwestError),

    /// The URL (or a redirect target) could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The redirect chain did not settle within the hop limit.
    #[error("Too many redirects starting at {0}")]
    TooManyRedirects(String),
}

/// Error types for manifest parsing.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The manifest body could not be parsed.
    #[error("Failed to parse manifest {url}: {reason}")]
    Parse { url: String, reason: String },
}

/// Error types for the external fallback resolver.
#[derive(Error, Debug)]
pub enum FallbackError {
    /// The resolver process could not be spawned or read.
    #[error("Fallback resolver I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The resolver did not finish in time.
    #[error("Fallback resolver timed out after {0}s")]
    Timeout(u64),

    /// The resolver exited unsuccessfully.
    #[error("Fallback resolver exited with {code:?}: {stderr}")]
    Exit { code: Option<i32>, stderr: String },

    /// The resolver output was not the expected JSON document.
    #[error("Fallback resolver output error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fatal outcomes of a resolution request.
///
/// Everything else (rejected candidates, failed stages, broken manifests) is
/// logged and skipped.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The input is not an http(s) URL, or its pages offered no playlist,
    /// iframe or redirect and the fallback found nothing.
    #[error("No resolver available for {0}")]
    NoResolver(String),

    /// A page answered 403 or 404.
    #[error("No streams found on {0}")]
    NoStreamsFound(String),

    /// Too many chained iframe/redirect follows.
    #[error("Recursion limit of {limit} exceeded while resolving {url}")]
    RecursionLimitExceeded { limit: usize, url: String },

    /// A page fetch failed with a non-terminal, non-retriable error.
    #[error("Failed to fetch page: {0}")]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Initialization(#[from] InitializationError),
}

/// Why a candidate URL was dropped by the classification chain.
///
/// Variants are listed in the order the checks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum RejectReason {
    SameUrl,
    BadScheme,
    WhitelistNetlocFail,
    WhitelistPathFail,
    BlacklistStatic,
    BlacklistNetloc,
    BlacklistPath,
    BlacklistEndswith,
    BlacklistFilepath,
    AdsHeuristic,
    SamePathBlacklist,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RejectReason {
    /// Returns the reason code written to the log.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::SameUrl => "same-URL",
            RejectReason::BadScheme => "bad-scheme",
            RejectReason::WhitelistNetlocFail => "whitelist-netloc-fail",
            RejectReason::WhitelistPathFail => "whitelist-path-fail",
            RejectReason::BlacklistStatic => "blacklist-static",
            RejectReason::BlacklistNetloc => "blacklist-netloc",
            RejectReason::BlacklistPath => "blacklist-path",
            RejectReason::BlacklistEndswith => "blacklist-endswith",
            RejectReason::BlacklistFilepath => "blacklist-filepath",
            RejectReason::AdsHeuristic => "ads-heuristic",
            RejectReason::SamePathBlacklist => "same-path-blacklist",
        }
    }
}

/// Types of informational metrics recorded while resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    HttpRedirect,
    IframeFollowed,
    ScriptRedirectFollowed,
    EmbedSubstituted,
    StreamSkipped,
    PlaylistCapReached,
    FallbackUsed,
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::HttpRedirect => "HTTP redirect",
            InfoType::IframeFollowed => "Iframe followed",
            InfoType::ScriptRedirectFollowed => "Script redirect followed",
            InfoType::EmbedSubstituted => "Embed widget substituted",
            InfoType::StreamSkipped => "Stream skipped",
            InfoType::PlaylistCapReached => "Playlist cap reached",
            InfoType::FallbackUsed => "Fallback resolver used",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_reject_reason_as_str() {
        assert_eq!(RejectReason::SameUrl.as_str(), "same-URL");
        assert_eq!(RejectReason::BlacklistStatic.as_str(), "blacklist-static");
        assert_eq!(
            RejectReason::SamePathBlacklist.to_string(),
            "same-path-blacklist"
        );
    }

    #[test]
    fn test_all_reject_reasons_have_distinct_codes() {
        let codes: std::collections::HashSet<&str> =
            RejectReason::iter().map(|r| r.as_str()).collect();
        assert_eq!(codes.len(), RejectReason::iter().count());
    }

    #[test]
    fn test_all_info_types_have_string_representation() {
        for info_type in InfoType::iter() {
            assert!(
                !info_type.as_str().is_empty(),
                "{:?} should have non-empty string",
                info_type
            );
        }
    }

    #[test]
    fn test_resolve_error_messages() {
        let err = ResolveError::RecursionLimitExceeded {
            limit: 3,
            url: "http://example.com/a".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Recursion limit of 3 exceeded while resolving http://example.com/a"
        );
        assert_eq!(
            ResolveError::NoStreamsFound("http://example.com".to_string()).to_string(),
            "No streams found on http://example.com"
        );
    }
}
