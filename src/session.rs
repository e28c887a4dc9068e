//! Session state shared by every resolution attempt.
//!
//! The session records each URL the resolver has attempted, in order. The
//! history is used for referer chaining and to refuse already-visited
//! candidates. It also holds the merged path tables, which are built once
//! from the static rules and the user's options on first use.

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::config::Config;
use crate::filter::{merge_path_list, static_blacklist_path, PathRule};

/// One entry in the session history, as seen by the attempt that added it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    /// 1-based position of the URL in the history
    pub number: usize,
    /// The URL being resolved
    pub url: String,
    /// Previous history entry, or the URL itself on the first attempt
    pub referer: String,
}

/// Visited-URL history and cached path tables.
///
/// All methods take `&self`; share a session between resolvers with `Arc`.
#[derive(Debug, Default)]
pub struct Session {
    history: Mutex<Vec<String>>,
    blacklist_path: OnceLock<Vec<PathRule>>,
    whitelist_path: OnceLock<Vec<PathRule>>,
}

impl Session {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_history(&self) -> MutexGuard<'_, Vec<String>> {
        // a panic while holding the lock cannot leave the Vec half-written
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `url` to the history and returns the resulting attempt.
    pub fn begin_attempt(&self, url: &str) -> Attempt {
        let mut history = self.lock_history();
        let referer = history.last().cloned().unwrap_or_else(|| url.to_string());
        history.push(url.to_string());
        Attempt {
            number: history.len(),
            url: url.to_string(),
            referer,
        }
    }

    /// True if `url` has been attempted in this session.
    pub fn contains(&self, url: &str) -> bool {
        self.lock_history().iter().any(|seen| seen == url)
    }

    /// Snapshot of the history, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.lock_history().clone()
    }

    /// Number of attempts so far.
    pub fn attempts(&self) -> usize {
        self.lock_history().len()
    }

    /// Static path deny rules merged with `config.blacklist_path`.
    ///
    /// Built on first call; later calls return the same table even if a
    /// different configuration is passed.
    pub fn blacklist_path(&self, config: &Config) -> &[PathRule] {
        self.blacklist_path
            .get_or_init(|| merge_path_list(static_blacklist_path(), &config.blacklist_path))
    }

    /// Iframe path allow rules from `config.whitelist_path`. Empty means no
    /// restriction.
    pub fn whitelist_path(&self, config: &Config) -> &[PathRule] {
        self.whitelist_path
            .get_or_init(|| merge_path_list(Vec::new(), &config.whitelist_path))
    }
}
