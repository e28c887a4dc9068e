//! Configuration module.
//!
//! This module contains all configuration-related types and constants:
//! - Constants for timeouts, limits, and operational parameters
//! - Library configuration (`Config`)
//! - Command-line parsing (`Opt`)

mod cli;
mod constants;
mod types;

// Re-export public API
pub use cli::Opt;
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel};
