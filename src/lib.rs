//! stream_resolver library: turns an arbitrary web page into playable streams
//!
//! The resolver fetches a page, reverses common JavaScript obfuscation, and
//! looks for media URLs (`.m3u8`, `.mpd`, `.mp3`, `.mp4`). When there are none
//! it follows an iframe or a script redirect and tries again, and as a last
//! resort hands the page to an external resolver (`yt-dlp`).
//!
//! # Example
//!
//! ```no_run
//! use futures::StreamExt;
//! use stream_resolver::{Config, Resolver};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = Resolver::builder(Config::default()).build()?;
//! let mut resolution = resolver.resolve("https://example.com/live").await?;
//! println!("{}", resolution.title);
//! while let Some(stream) = resolution.streams.next().await {
//!     println!("{} {} {}", stream.label, stream.kind, stream.url);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

mod app;
pub mod config;
pub mod error_handling;
pub mod extract;
pub mod fallback;
pub mod fetch;
pub mod filter;
pub mod initialization;
pub mod protocol;
mod resolver;
pub mod session;
pub mod unpack;
mod utils;

// Re-export public API
pub use app::normalize_input;
pub use config::{Config, LogFormat, LogLevel, Opt};
pub use error_handling::{ResolutionStats, ResolveError};
pub use fallback::{FallbackOutput, FallbackResolver, YtDlpResolver};
pub use fetch::{FetchedPage, HttpFetcher, PageFetcher};
pub use protocol::{Dispatcher, ManifestParser, StreamDescriptor, StreamKind, Variant};
pub use resolver::{IframeChooser, NoChoice, Resolution, Resolver, ResolverBuilder};
pub use session::Session;
pub use unpack::deobfuscate;
pub use utils::sanitize_filename;
