//! Skip statistics tracking.
//!
//! Counts items dropped by the best-effort pipelines (imports, ingest, aggregation)
//! per [`SkipReason`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::SkipReason;

/// Thread-safe skip counters.
///
/// All reasons are initialized to zero on creation, so lookups never miss.
pub struct SkipStats {
    counts: HashMap<SkipReason, AtomicUsize>,
}

impl SkipStats {
    pub fn new() -> Self {
        let mut counts = HashMap::new();
        for reason in SkipReason::iter() {
            counts.insert(reason, AtomicUsize::new(0));
        }
        SkipStats { counts }
    }

    /// Increment the counter for `reason`.
    pub fn increment(&self, reason: SkipReason) {
        if let Some(counter) = self.counts.get(&reason) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment skip counter for {:?} which is not in the map",
                reason
            );
        }
    }

    pub fn get(&self, reason: SkipReason) -> usize {
        self.counts
            .get(&reason)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    /// Logs every non-zero counter at info level.
    pub fn log_summary(&self, what: &str) {
        let total = self.total();
        if total == 0 {
            return;
        }
        log::info!("Skipped {} ({} total):", what, total);
        for reason in SkipReason::iter() {
            let count = self.get(reason);
            if count > 0 {
                log::info!("   {}: {}", reason.as_str(), count);
            }
        }
    }
}

impl Default for SkipStats {
    fn default() -> Self {
        Self::new()
    }
}
