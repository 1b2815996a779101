//! Index subsystem - the concurrency kernel of the store
//!
//! An `Index` holds one immutable `Snapshot` behind an atomically swappable
//! reference. Everything else in the store is built on two operations:
//!
//! - `Index::snapshot` - load the current snapshot (never blocks)
//! - `Index::exchange` - CAS the reference from an expected snapshot to a new one
//!
//! # Invariants
//!
//! - The held reference always points at a complete snapshot, never a partial one
//! - Every successful exchange strictly advances the index to a new snapshot
//! - Snapshots are immutable; a reader's view never changes under it

mod atomic;
mod snapshot;

use std::fmt;

pub use atomic::Index;
pub use snapshot::Snapshot;

/// Bounds shared by hash keys and range keys.
pub trait DocumentKey: Ord + Clone + fmt::Debug {}

impl<T: Ord + Clone + fmt::Debug> DocumentKey for T {}
