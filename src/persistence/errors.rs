//! Persistence error types
//!
//! Error codes:
//! - PERSIST_IO
//! - PERSIST_SERIALIZATION
//! - PERSIST_CORRUPTED
//! - PERSIST_UNSUPPORTED_VERSION
//! - PERSIST_DUPLICATE_DOCUMENT

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("[ERROR] PERSIST_IO: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("[ERROR] PERSIST_SERIALIZATION: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The file parsed but does not match its manifest, or did not parse at all
    #[error("[ERROR] PERSIST_CORRUPTED: {path}: {reason}")]
    Corrupted { path: PathBuf, reason: String },

    #[error("[ERROR] PERSIST_UNSUPPORTED_VERSION: {path}: format version {version}")]
    UnsupportedVersion { path: PathBuf, version: u8 },

    /// Two documents in the file share one identity
    #[error("[ERROR] PERSIST_DUPLICATE_DOCUMENT: {path}: {key}")]
    DuplicateDocument { path: PathBuf, key: String },
}

impl PersistenceError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn corrupted(path: &Path, reason: impl Into<String>) -> Self {
        PersistenceError::Corrupted {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PersistenceError::Io { .. } => "PERSIST_IO",
            PersistenceError::Serialization(_) => "PERSIST_SERIALIZATION",
            PersistenceError::Corrupted { .. } => "PERSIST_CORRUPTED",
            PersistenceError::UnsupportedVersion { .. } => "PERSIST_UNSUPPORTED_VERSION",
            PersistenceError::DuplicateDocument { .. } => "PERSIST_DUPLICATE_DOCUMENT",
        }
    }

    pub fn is_corrupted(&self) -> bool {
        matches!(self, PersistenceError::Corrupted { .. })
    }
}
