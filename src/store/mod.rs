//! Document store access layer
//!
//! `DocumentReader` and `DocumentWriter` are the public contract of the store.
//! `Index` implements both; `Clock` and `KeyEncoder` are written against the
//! traits only, so they run on any store that honors the same contract.
//!
//! # Concurrency
//!
//! - Reads capture one snapshot and never block
//! - Writes are optimistic: rebuild, exchange, retry on a lost race
//! - Retries are bounded only by the caller's `CancellationToken`
//!
//! # Errors
//!
//! Lost exchanges are retried transparently. Duplicate keys, missing
//! documents, stale revisions and cancellation are returned as `StoreError`.

mod backoff;
mod errors;
mod reader;
mod writer;

pub use errors::{StoreError, StoreResult};
pub use reader::{DocumentReader, PointReader};
pub use writer::DocumentWriter;

pub use tokio_util::sync::CancellationToken;
