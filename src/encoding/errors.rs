//! Encoding error types

use thiserror::Error;

use super::packing::Dictionary;
use crate::store::StoreError;

pub type EncodingResult<T> = Result<T, EncodingError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// An ID does not fit the bit field reserved for its dictionary
    #[error("[ERROR] ENCODING_OVERFLOW: {dictionary} id {id} exceeds maximum {max}")]
    Overflow {
        dictionary: Dictionary,
        id: u64,
        max: u64,
    },

    /// The backing store rejected a read-modify-write
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EncodingError {
    pub fn code(&self) -> &'static str {
        match self {
            EncodingError::Overflow { .. } => "ENCODING_OVERFLOW",
            EncodingError::Store(e) => e.code(),
        }
    }
}
