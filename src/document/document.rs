//! Document - immutable keyed record
//!
//! Identity is `(hash_key, range_key)`. Point documents use `()` as the range key.
//! The version is owned by the store: callers pass the revision they last
//! observed, the store decides what is written.

use serde::{Deserialize, Serialize};

use crate::entity::Revision;

/// An immutable record stored in an `Index`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document<H, R, P> {
    hash_key: H,
    range_key: R,
    version: Revision,
    payload: P,
}

/// A document addressed by its hash key alone.
pub type PointDocument<H, P> = Document<H, (), P>;

impl<H, R, P> Document<H, R, P> {
    /// Creates a document at `Revision::ZERO`.
    pub fn new(hash_key: H, range_key: R, payload: P) -> Self {
        Self {
            hash_key,
            range_key,
            version: Revision::ZERO,
            payload,
        }
    }

    /// Returns a copy carrying the given version.
    ///
    /// For `update`, this is the revision the caller last observed.
    pub fn with_version(mut self, version: Revision) -> Self {
        self.version = version;
        self
    }

    pub fn with_payload(mut self, payload: P) -> Self {
        self.payload = payload;
        self
    }

    #[inline]
    pub fn hash_key(&self) -> &H {
        &self.hash_key
    }

    #[inline]
    pub fn range_key(&self) -> &R {
        &self.range_key
    }

    #[inline]
    pub fn version(&self) -> Revision {
        self.version
    }

    #[inline]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn into_payload(self) -> P {
        self.payload
    }
}

impl<H, P> Document<H, (), P> {
    /// Creates a point document at `Revision::ZERO`.
    pub fn point(hash_key: H, payload: P) -> Self {
        Self::new(hash_key, (), payload)
    }
}
