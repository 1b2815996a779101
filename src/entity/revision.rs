//! Revision - monotonic document version counter
//!
//! A revision is assigned by the store, never by the caller:
//! - Inserted documents start at `Revision::ZERO`
//! - Every successful update ticks the stored revision by one
//!
//! Serialized as its decimal string form.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An unsigned 64-bit version counter, totally ordered by value.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Revision(u64);

impl Revision {
    /// The revision of a freshly inserted document.
    pub const ZERO: Revision = Revision(0);

    #[inline]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns the next revision.
    ///
    /// Panics in debug builds if the counter is exhausted; writers use
    /// `checked_tick` instead.
    #[inline]
    pub fn tick(self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the next revision, or `None` once `u64::MAX` is reached.
    #[inline]
    pub fn checked_tick(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Revision {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}

impl From<u64> for Revision {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Serialize for Revision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Revision {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
