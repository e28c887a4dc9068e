//! Configuration constants.
//!
//! This module defines the operational parameters used throughout the resolver:
//! timeouts, header values, follow limits and retry settings.

/// Crate version reported in the banner of the first resolution attempt.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Default User-Agent string for page and manifest requests.
///
/// Users can override this via the `--user-agent` CLI flag.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// User-Agent sent when a page has to be re-fetched after a content-encoding failure.
pub const FALLBACK_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Accept-Encoding sent together with [`FALLBACK_USER_AGENT`].
pub const FALLBACK_ACCEPT_ENCODING: &str = "deflate";

// Resolution limits
/// Default number of URLs resolved per protocol kind on a single page
pub const DEFAULT_PLAYLIST_MAX: usize = 5;
/// Maximum number of chained iframe/redirect follows before giving up
pub const DEFAULT_MAX_DEPTH: usize = 10;
/// Upper bound on substitution passes for a single deobfuscation stage.
///
/// Each pass replaces at least one match, so well-formed input converges long
/// before this. Hostile input that regenerates its own pattern stops here.
pub const MAX_UNPACK_PASSES: usize = 64;

// Redirect handling
/// Maximum number of redirect hops to follow per page fetch
pub const MAX_REDIRECT_HOPS: usize = 10;

// Retry strategy
/// Initial delay in milliseconds before first retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 5;
/// Maximum number of retries after the initial attempt
pub const RETRY_MAX_ATTEMPTS: usize = 2;

// HTTP status codes (for clarity and consistency)
pub const HTTP_STATUS_FORBIDDEN: u16 = 403;
pub const HTTP_STATUS_NOT_FOUND: u16 = 404;
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;

// External fallback resolver
/// Executable used by the yt-dlp fallback resolver
pub const DEFAULT_YTDLP_PATH: &str = "yt-dlp";
/// Time allowed for the fallback resolver process, in seconds
pub const FALLBACK_TIMEOUT_SECS: u64 = 60;
