//! Error handling and resolution statistics.
//!
//! This module provides:
//! - Error type definitions (`ResolveError` and the per-component errors)
//! - Rejection reason codes for the classification chain
//! - Resolution statistics tracking
//! - Fetch error categorization and retry strategy

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{
    categorize_fetch_error, get_retry_strategy, is_retriable_error, FetchFailure,
};
pub use stats::ResolutionStats;
pub use types::{
    FallbackError, FetchError, InfoType, InitializationError, ManifestError, RejectReason,
    ResolveError, UnbaseError, UnpackError,
};
