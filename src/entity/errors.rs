//! Entity error types
//!
//! Key validation failures are fatal for the offending input and never retried.

use std::fmt;

use thiserror::Error;

/// Why a key was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidKeyReason {
    /// The input was empty.
    Empty,
    /// The input consisted only of whitespace.
    Whitespace,
    /// The input contained a character outside the key alphabet.
    InvalidCharacter(char),
}

impl fmt::Display for InvalidKeyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidKeyReason::Empty => write!(f, "key is empty"),
            InvalidKeyReason::Whitespace => write!(f, "key is whitespace"),
            InvalidKeyReason::InvalidCharacter(c) => write!(f, "invalid character {:?}", c),
        }
    }
}

/// A key failed validation at construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[ERROR] ENTITY_INVALID_KEY: {reason} (input: {input:?})")]
pub struct InvalidKeyError {
    input: String,
    reason: InvalidKeyReason,
}

impl InvalidKeyError {
    pub(crate) fn new(input: impl Into<String>, reason: InvalidKeyReason) -> Self {
        Self {
            input: input.into(),
            reason,
        }
    }

    /// The rejected input, as given.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn reason(&self) -> &InvalidKeyReason {
        &self.reason
    }

    pub fn code(&self) -> &'static str {
        "ENTITY_INVALID_KEY"
    }
}
