//! External fallback resolver.
//!
//! Used only after the page pipeline is exhausted (or exclusively, with
//! `ytdl_only`). The resolver is a black box: whatever it reports is turned
//! into stream descriptors, with manifest URLs expanded by the dispatcher.

mod ytdlp;

use async_trait::async_trait;

use crate::error_handling::FallbackError;
use crate::protocol::StreamDescriptor;

// Re-export public API
pub use ytdlp::YtDlpResolver;

/// What a fallback resolver found for a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackOutput {
    /// Title reported by the resolver; overrides the page title
    pub title: Option<String>,
    /// Directly playable streams
    pub streams: Vec<StreamDescriptor>,
    /// HLS/DASH manifest URLs to be expanded into variants
    pub manifests: Vec<String>,
}

impl FallbackOutput {
    /// True if nothing playable was reported.
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty() && self.manifests.is_empty()
    }
}

/// Resolves a page URL with an external tool.
#[async_trait]
pub trait FallbackResolver: Send + Sync {
    async fn resolve(&self, url: &str) -> Result<FallbackOutput, FallbackError>;
}
