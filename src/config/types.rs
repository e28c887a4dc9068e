//! Configuration types.
//!
//! This module defines the library configuration and the enums shared with
//! command-line argument parsing.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::config::constants::{
    DEFAULT_MAX_DEPTH, DEFAULT_PLAYLIST_MAX, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    DEFAULT_YTDLP_PATH,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// Every list option holds raw user entries; they are merged with the static
/// policy tables lazily by the session.
///
/// # Examples
///
/// ```no_run
/// use stream_resolver::Config;
///
/// let config = Config {
///     blacklist_netloc: vec!["ads.example.com".to_string()],
///     playlist_max: 3,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// URL-like entries merged into the path deny table
    pub blacklist_path: Vec<String>,

    /// URL-like entries an iframe must match (netloc suffix + path prefix)
    pub whitelist_path: Vec<String>,

    /// Domain suffixes an iframe netloc must end with
    pub whitelist_netloc: Vec<String>,

    /// Domain suffixes that are never resolved
    pub blacklist_netloc: Vec<String>,

    /// Path suffixes that are never resolved
    pub blacklist_filepath: Vec<String>,

    /// Disable the visited-URL check
    pub ignore_same_url: bool,

    /// Referer sent when dispatching playlists, instead of the page URL
    pub playlist_referer: Option<String>,

    /// Maximum number of URLs resolved per protocol kind
    pub playlist_max: usize,

    /// Never use the fallback resolver
    pub ytdl_disable: bool,

    /// Use only the fallback resolver
    pub ytdl_only: bool,

    /// Dump every deobfuscated page into `debug_dir`
    pub debug: bool,

    /// Directory for debug dumps
    pub debug_dir: PathBuf,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Maximum number of chained iframe/redirect follows
    pub max_depth: usize,

    /// Executable used by the fallback resolver
    pub ytdlp_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            blacklist_path: Vec::new(),
            whitelist_path: Vec::new(),
            whitelist_netloc: Vec::new(),
            blacklist_netloc: Vec::new(),
            blacklist_filepath: Vec::new(),
            ignore_same_url: false,
            playlist_referer: None,
            playlist_max: DEFAULT_PLAYLIST_MAX,
            ytdl_disable: false,
            ytdl_only: false,
            debug: false,
            debug_dir: PathBuf::from("."),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
            ytdlp_path: DEFAULT_YTDLP_PATH.to_string(),
        }
    }
}

impl Config {
    /// Whether the fallback resolver may run after the page pipeline is exhausted.
    pub fn fallback_enabled(&self) -> bool {
        !self.ytdl_disable && !self.ytdl_only
    }
}
