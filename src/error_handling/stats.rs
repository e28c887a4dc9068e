//! Resolution statistics tracking.
//!
//! This module provides thread-safe counters for candidate rejections and
//! notable events during resolution.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::{InfoType, RejectReason};

/// Thread-safe resolution statistics tracker.
///
/// Every reason and info type is initialized to zero on creation, so lookups
/// never miss. Share it across tasks with `Arc`.
pub struct ResolutionStats {
    rejections: HashMap<RejectReason, AtomicUsize>,
    info: HashMap<InfoType, AtomicUsize>,
}

impl ResolutionStats {
    pub fn new() -> Self {
        let mut rejections = HashMap::new();
        for reason in RejectReason::iter() {
            rejections.insert(reason, AtomicUsize::new(0));
        }

        let mut info = HashMap::new();
        for info_type in InfoType::iter() {
            info.insert(info_type, AtomicUsize::new(0));
        }

        ResolutionStats { rejections, info }
    }

    /// Increment a rejection counter.
    pub fn increment_rejection(&self, reason: RejectReason) {
        if let Some(counter) = self.rejections.get(&reason) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment rejection counter for {:?} which is not in the map.",
                reason
            );
        }
    }

    /// Increment an info counter.
    pub fn increment_info(&self, info_type: InfoType) {
        if let Some(counter) = self.info.get(&info_type) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment info counter for {:?} which is not in the map.",
                info_type
            );
        }
    }

    pub fn get_rejection_count(&self, reason: RejectReason) -> usize {
        self.rejections
            .get(&reason)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn get_info_count(&self, info_type: InfoType) -> usize {
        self.info
            .get(&info_type)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn total_rejections(&self) -> usize {
        self.rejections
            .values()
            .map(|c| c.load(Ordering::SeqCst))
            .sum()
    }

    /// Logs every non-zero counter at debug level.
    pub fn log_summary(&self) {
        log::debug!("Rejected candidates: {}", self.total_rejections());
        for reason in RejectReason::iter() {
            let count = self.get_rejection_count(reason);
            if count > 0 {
                log::debug!("Rejected ({}): {}", reason.as_str(), count);
            }
        }
        for info_type in InfoType::iter() {
            let count = self.get_info_count(info_type);
            if count > 0 {
                log::debug!("{}: {}", info_type.as_str(), count);
            }
        }
    }
}

impl Default for ResolutionStats {
    fn default() -> Self {
        Self::new()
    }
}
