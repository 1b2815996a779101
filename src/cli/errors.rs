//! CLI error types
//!
//! Every CLI error is fatal to the command: it is printed to stderr and the
//! process exits non-zero.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::encoding::EncodingError;
use crate::entity::InvalidKeyError;
use crate::persistence::PersistenceError;
use crate::store::StoreError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    InvalidKey(#[from] InvalidKeyError),

    #[error("[ERROR] CLI_INVALID_ARGUMENT: {0}")]
    InvalidArgument(String),

    /// A packed key refers to an ID no dictionary holds
    #[error("[ERROR] CLI_UNKNOWN_KEY: {0} does not decode")]
    UnknownKey(String),

    #[error("[ERROR] CLI_IO: {0}")]
    Io(#[from] io::Error),

    #[error("[ERROR] CLI_IO: JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(e) => e.code(),
            CliError::Persistence(e) => e.code(),
            CliError::Encoding(e) => e.code(),
            CliError::Store(e) => e.code(),
            CliError::InvalidKey(e) => e.code(),
            CliError::InvalidArgument(_) => "CLI_INVALID_ARGUMENT",
            CliError::UnknownKey(_) => "CLI_UNKNOWN_KEY",
            CliError::Io(_) | CliError::Json(_) => "CLI_IO",
        }
    }
}
