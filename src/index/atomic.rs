//! Index - the single shared mutable cell of the store
//!
//! An index holds exactly one `Arc<Snapshot>` at a time. The only way to
//! change it is `exchange`, a compare-and-swap on the pointer: the swap happens
//! iff the held snapshot is still the one the writer started from.
//!
//! - Readers never block: `snapshot()` is a single atomic load
//! - Writers never lock: they rebuild from the latest snapshot and retry
//! - Replaced snapshots stay alive while any reader still holds them

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use super::snapshot::Snapshot;
use super::DocumentKey;
use crate::config::{BackoffConfig, StoreConfig};
use crate::observability::StoreMetrics;

/// An atomically swappable snapshot reference.
pub struct Index<H, R, P> {
    current: ArcSwap<Snapshot<H, R, P>>,
    metrics: StoreMetrics,
    backoff: BackoffConfig,
}

impl<H: DocumentKey, R: DocumentKey, P> Index<H, R, P> {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::from_snapshot(Snapshot::new())
    }

    /// Creates an index that starts at `snapshot`.
    pub fn from_snapshot(snapshot: Snapshot<H, R, P>) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
            metrics: StoreMetrics::new(),
            backoff: BackoffConfig::default(),
        }
    }

    /// Creates an empty index that retries per `config.backoff`.
    pub fn with_config(config: &StoreConfig) -> Self {
        Self::new().with_backoff(config.backoff)
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Returns the currently visible snapshot.
    #[inline]
    pub fn snapshot(&self) -> Arc<Snapshot<H, R, P>> {
        self.current.load_full()
    }

    /// Replaces the held snapshot with `replacement` iff it is still `expected`.
    ///
    /// Identity is pointer identity, not structural equality. Returns whether
    /// the exchange happened.
    pub fn exchange(
        &self,
        expected: &Arc<Snapshot<H, R, P>>,
        replacement: Arc<Snapshot<H, R, P>>,
    ) -> bool {
        let previous = self.current.compare_and_swap(expected, replacement);
        Arc::ptr_eq(&previous, expected)
    }

    pub fn metrics(&self) -> &StoreMetrics {
        &self.metrics
    }

    pub fn backoff(&self) -> BackoffConfig {
        self.backoff
    }
}

impl<H: DocumentKey, R: DocumentKey, P> Default for Index<H, R, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: DocumentKey, R: DocumentKey, P> fmt::Debug for Index<H, R, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index")
            .field("snapshot", &*self.current.load())
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}
