//! rebac-store - versioned document store and key encoder
//!
//! The storage substrate of a relationship-based authorization service:
//!
//! - `index`: lock-free snapshot index, one atomic reference over a
//!   persistent two-level map
//! - `store`: the `DocumentReader` / `DocumentWriter` contract with
//!   optimistic, cancellable retries
//! - `clock`: persisted monotonic counters built on that contract
//! - `encoding`: dictionary encoding and 64-bit packing of
//!   `(resource, relationship)` pairs
//! - `persistence`: checksummed JSON snapshot files
//!
//! ```ignore
//! use rebac_store::encoding::{KeyEncoder, Resource};
//! use rebac_store::entity::Key;
//! use rebac_store::store::CancellationToken;
//!
//! let encoder = KeyEncoder::in_memory();
//! let resource = Resource::new("docs", "readme")?;
//! let packed = encoder.pack(&resource, &Key::new("viewer")?, &CancellationToken::new())?;
//! assert_eq!(encoder.decode(packed), Some((resource, Key::new("viewer")?)));
//! ```

pub mod cli;
pub mod clock;
pub mod config;
pub mod document;
pub mod encoding;
pub mod entity;
pub mod index;
pub mod observability;
pub mod persistence;
pub mod store;
