//! Store error types
//!
//! Only semantic conflicts and cancellation surface here. A lost exchange
//! against the index is not an error: writers retry it internally.
//!
//! Error codes:
//! - STORE_DUPLICATE_KEY - insert target already exists
//! - STORE_NOT_FOUND - update target absent
//! - STORE_VERSION_CONFLICT - caller's revision is stale
//! - STORE_CANCELLED - cancellation observed between retries
//! - STORE_FAILURE - anything else the store cannot do

use std::fmt;

use thiserror::Error;

use crate::entity::Revision;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("[ERROR] STORE_DUPLICATE_KEY: document already exists ({key})")]
    DuplicateKey { key: String },

    #[error("[ERROR] STORE_NOT_FOUND: document does not exist ({key})")]
    NotFound { key: String },

    #[error(
        "[ERROR] STORE_VERSION_CONFLICT: caller holds revision {expected} \
         but stored revision is {actual} ({key})"
    )]
    VersionConflict {
        key: String,
        expected: Revision,
        actual: Revision,
    },

    #[error("[ERROR] STORE_CANCELLED: {operation} cancelled after {attempts} attempts ({key})")]
    Cancelled {
        key: String,
        operation: &'static str,
        attempts: u64,
    },

    #[error("[ERROR] STORE_FAILURE: {0}")]
    Storage(String),
}

impl StoreError {
    pub(crate) fn duplicate_key<H: fmt::Debug, R: fmt::Debug>(hash_key: &H, range_key: &R) -> Self {
        StoreError::DuplicateKey {
            key: describe_key(hash_key, range_key),
        }
    }

    pub(crate) fn not_found<H: fmt::Debug, R: fmt::Debug>(hash_key: &H, range_key: &R) -> Self {
        StoreError::NotFound {
            key: describe_key(hash_key, range_key),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            StoreError::DuplicateKey { .. } => "STORE_DUPLICATE_KEY",
            StoreError::NotFound { .. } => "STORE_NOT_FOUND",
            StoreError::VersionConflict { .. } => "STORE_VERSION_CONFLICT",
            StoreError::Cancelled { .. } => "STORE_CANCELLED",
            StoreError::Storage(_) => "STORE_FAILURE",
        }
    }

    /// True if re-reading and retrying the operation can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::VersionConflict { .. })
    }

    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, StoreError::Cancelled { .. })
    }
}

/// Renders a document identity for error messages and logs.
pub(crate) fn describe_key<H: fmt::Debug, R: fmt::Debug>(hash_key: &H, range_key: &R) -> String {
    format!("hash={:?} range={:?}", hash_key, range_key)
}
