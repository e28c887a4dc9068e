//! Utility functions.
//!
//! This module provides helpers shared across components:
//! - Regex compilation and look-around emulation
//! - CSS selector compilation
//! - File name sanitization for debug dumps

pub(crate) mod pattern;
mod sanitize;
mod selector;

// Re-export public API
pub use sanitize::sanitize_filename;
pub(crate) use selector::parse_selector_unsafe;
