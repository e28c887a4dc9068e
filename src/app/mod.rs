//! Application-level input handling.
//!
//! This module provides validation and normalization of the URL given on the
//! command line or to [`crate::Resolver::resolve`].

pub mod url;

// Re-export public API
pub use self::url::normalize_input;
