//! URL repair and classification.
//!
//! This module provides:
//! - Repair of raw candidates into absolute URLs
//! - The static policy tables and (netloc, path) rules
//! - The ordered classification chain and the accepted-URL list

mod classify;
mod repair;
mod rules;

// Re-export public API
pub use classify::{Classifier, Verdict};
pub use repair::repair;
pub use rules::{
    drops_referer, is_ads_url, is_origin_sensitive, is_same_path_blacklisted, matches_any_prefix,
    merge_path_list, netloc, static_blacklist_path, PathRule, BLACKLIST_ENDSWITH,
    EMBEDLY_NETLOC, EMBEDLY_PATH, ORIGIN_SENSITIVE_SUFFIXES, REFERER_INCOMPATIBLE_HOSTS,
    STATIC_BLACKLIST_NETLOC,
};
