//! Documents and range queries
//!
//! - `Document` - immutable record keyed by hash key and range key
//! - `RangeQuery` - closed set of range-key scans

#[allow(clippy::module_inception)]
mod document;
mod range;

pub use document::{Document, PointDocument};
pub use range::RangeQuery;
