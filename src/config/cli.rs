//! Command-line options.

use std::path::PathBuf;

use clap::Parser;

use crate::config::constants::{
    DEFAULT_MAX_DEPTH, DEFAULT_PLAYLIST_MAX, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    DEFAULT_YTDLP_PATH,
};
use crate::config::types::{Config, LogFormat, LogLevel};

/// Command-line options and configuration.
///
/// List options accept comma-separated values and may be repeated.
///
/// # Examples
///
/// ```bash
/// # Basic usage
/// stream_resolver https://example.com/live
///
/// # Explicit opt-in scheme, only follow iframes on known hosts
/// stream_resolver "resolve://example.com/watch" --whitelist-netloc player.example.net,cdn.example.org
///
/// # Dump every deobfuscated page for inspection
/// stream_resolver https://example.com/live --debug --debug-dir ./dumps
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "stream_resolver",
    about = "Resolves a web page into playable HLS, DASH and HTTP streams."
)]
pub struct Opt {
    /// Page URL, optionally prefixed with generic:// or resolve://
    pub url: String,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// URL-like entries (netloc/path) that are never resolved
    #[arg(long, value_delimiter = ',')]
    pub blacklist_path: Vec<String>,

    /// URL-like entries (netloc/path) an iframe must match
    #[arg(long, value_delimiter = ',')]
    pub whitelist_path: Vec<String>,

    /// Domain suffixes an iframe must be hosted on
    #[arg(long, value_delimiter = ',')]
    pub whitelist_netloc: Vec<String>,

    /// Domain suffixes that are never resolved
    #[arg(long, value_delimiter = ',')]
    pub blacklist_netloc: Vec<String>,

    /// Path suffixes that are never resolved
    #[arg(long, value_delimiter = ',')]
    pub blacklist_filepath: Vec<String>,

    /// Resolve URLs that were already visited in this session
    #[arg(long)]
    pub ignore_same_url: bool,

    /// Referer used for playlist requests instead of the page URL
    #[arg(long)]
    pub playlist_referer: Option<String>,

    /// Number of URLs resolved per protocol (HLS, DASH, HTTP)
    #[arg(long, default_value_t = DEFAULT_PLAYLIST_MAX)]
    pub playlist_max: usize,

    /// Never fall back to yt-dlp
    #[arg(long, conflicts_with = "ytdl_only")]
    pub ytdl_disable: bool,

    /// Only use yt-dlp, skip the page pipeline
    #[arg(long)]
    pub ytdl_only: bool,

    /// Write every deobfuscated page to an .html file
    #[arg(long)]
    pub debug: bool,

    /// Directory for --debug dumps
    #[arg(long, value_parser, default_value = ".")]
    pub debug_dir: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Maximum number of chained iframe/redirect follows
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// yt-dlp executable
    #[arg(long, default_value = DEFAULT_YTDLP_PATH)]
    pub ytdlp_path: String,

    /// Print streams as JSON lines
    #[arg(long)]
    pub json: bool,
}

impl Opt {
    /// Splits the options into the input URL and the library configuration.
    pub fn into_config(self) -> (String, Config) {
        let config = Config {
            log_level: self.log_level,
            log_format: self.log_format,
            blacklist_path: self.blacklist_path,
            whitelist_path: self.whitelist_path,
            whitelist_netloc: self.whitelist_netloc,
            blacklist_netloc: self.blacklist_netloc,
            blacklist_filepath: self.blacklist_filepath,
            ignore_same_url: self.ignore_same_url,
            playlist_referer: self.playlist_referer,
            playlist_max: self.playlist_max,
            ytdl_disable: self.ytdl_disable,
            ytdl_only: self.ytdl_only,
            debug: self.debug,
            debug_dir: self.debug_dir,
            timeout_seconds: self.timeout_seconds,
            user_agent: self.user_agent,
            max_depth: self.max_depth,
            ytdlp_path: self.ytdlp_path,
        };
        (self.url, config)
    }
}
