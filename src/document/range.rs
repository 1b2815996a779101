//! Range queries over the range keys of one hash-key partition
//!
//! All bounds are inclusive.

use std::ops::Bound;

/// Which range keys a scan should return.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RangeQuery<R> {
    /// Every range key.
    Unbound,
    /// Range keys `>= k`.
    LowerBound(R),
    /// Range keys `<= k`.
    UpperBound(R),
    /// Range keys in `lo..=hi`. Empty when `lo > hi`.
    Between(R, R),
}

impl<R: Ord> RangeQuery<R> {
    /// Returns true if `key` falls inside this range.
    pub fn contains(&self, key: &R) -> bool {
        match self {
            RangeQuery::Unbound => true,
            RangeQuery::LowerBound(lo) => key >= lo,
            RangeQuery::UpperBound(hi) => key <= hi,
            RangeQuery::Between(lo, hi) => key >= lo && key <= hi,
        }
    }

    /// Returns true if no key can satisfy this range.
    pub fn is_empty(&self) -> bool {
        matches!(self, RangeQuery::Between(lo, hi) if lo > hi)
    }

    /// Converts to a pair of bounds for ordered map range scans.
    pub fn bounds(&self) -> (Bound<&R>, Bound<&R>) {
        match self {
            RangeQuery::Unbound => (Bound::Unbounded, Bound::Unbounded),
            RangeQuery::LowerBound(lo) => (Bound::Included(lo), Bound::Unbounded),
            RangeQuery::UpperBound(hi) => (Bound::Unbounded, Bound::Included(hi)),
            RangeQuery::Between(lo, hi) => (Bound::Included(lo), Bound::Included(hi)),
        }
    }
}
