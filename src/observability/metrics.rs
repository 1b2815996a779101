//! Store metrics
//!
//! - Counters only
//! - Monotonic increase
//! - Relaxed ordering; values are exact once writers have quiesced

use std::sync::atomic::{AtomicU64, Ordering};

/// Operational counters for one `Index`.
#[derive(Debug, Default)]
pub struct StoreMetrics {
    /// Successful snapshot exchanges
    commits: AtomicU64,
    /// Exchanges lost to a concurrent writer
    cas_retries: AtomicU64,
    /// Inserts rejected because the key existed
    duplicate_rejections: AtomicU64,
    /// Updates rejected because the revision was stale
    version_conflicts: AtomicU64,
    /// Updates rejected because the document was absent
    not_found: AtomicU64,
    /// Writes abandoned on cancellation
    cancellations: AtomicU64,
}

impl StoreMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_commits(&self) {
        self.commits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cas_retries(&self) {
        self.cas_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_duplicate_rejections(&self) {
        self.duplicate_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_version_conflicts(&self) {
        self.version_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cancellations(&self) {
        self.cancellations.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time copy of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            commits: self.commits.load(Ordering::Relaxed),
            cas_retries: self.cas_retries.load(Ordering::Relaxed),
            duplicate_rejections: self.duplicate_rejections.load(Ordering::Relaxed),
            version_conflicts: self.version_conflicts.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of `StoreMetrics`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub commits: u64,
    pub cas_retries: u64,
    pub duplicate_rejections: u64,
    pub version_conflicts: u64,
    pub not_found: u64,
    pub cancellations: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics_are_zero() {
        assert_eq!(StoreMetrics::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_counters_increment_independently() {
        let metrics = StoreMetrics::new();
        metrics.increment_commits();
        metrics.increment_commits();
        metrics.increment_cas_retries();
        metrics.increment_version_conflicts();

        let snap = metrics.snapshot();
        assert_eq!(snap.commits, 2);
        assert_eq!(snap.cas_retries, 1);
        assert_eq!(snap.version_conflicts, 1);
        assert_eq!(snap.duplicate_rejections, 0);
        assert_eq!(snap.cancellations, 0);
    }

    #[test]
    fn test_concurrent_increments_are_exact() {
        let metrics = StoreMetrics::new();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..250 {
                        metrics.increment_commits();
                    }
                });
            }
        });
        assert_eq!(metrics.snapshot().commits, 1000);
    }
}
