//! Key - validated, case-normalized identifier
//!
//! Keys name every document in the store: hash keys, range keys, dictionary
//! entries and clock counters.
//!
//! - Non-empty, no whitespace
//! - Characters restricted to `[A-Za-z0-9_.:/@#!&*|-]`
//! - Lower-cased on construction, so equality and ordering are case-insensitive
//! - Immutable once constructed

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::errors::{InvalidKeyError, InvalidKeyReason};

const KEY_PATTERN: &str = r"^[A-Za-z0-9_.:/@#!&*|\-]+$";

static KEY_REGEX: OnceLock<Regex> = OnceLock::new();

fn key_regex() -> &'static Regex {
    KEY_REGEX.get_or_init(|| Regex::new(KEY_PATTERN).expect("key pattern is a valid regex"))
}

/// A validated, lower-cased identifier.
///
/// Ordering is ordinal over the normalized form.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(String);

impl Key {
    /// Validates and normalizes `value` into a key.
    pub fn new(value: impl AsRef<str>) -> Result<Self, InvalidKeyError> {
        let value = value.as_ref();

        if value.is_empty() {
            return Err(InvalidKeyError::new(value, InvalidKeyReason::Empty));
        }
        if value.trim().is_empty() {
            return Err(InvalidKeyError::new(value, InvalidKeyReason::Whitespace));
        }
        if !key_regex().is_match(value) {
            let offending = value
                .chars()
                .find(|c| !is_key_char(*c))
                .unwrap_or(' ');
            return Err(InvalidKeyError::new(
                value,
                InvalidKeyReason::InvalidCharacter(offending),
            ));
        }

        Ok(Self(value.to_lowercase()))
    }

    /// Returns the normalized key text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wraps a compile-time constant that is already a valid, lower-case key.
    pub(crate) fn from_static(value: &'static str) -> Self {
        debug_assert!(key_regex().is_match(value) && value == value.to_lowercase());
        Self(value.to_string())
    }

    /// Builds `<self>/<child>`.
    ///
    /// Both halves are already valid, so the joined key is valid too.
    pub fn join(&self, child: &Key) -> Key {
        Key(format!("{}/{}", self.0, child.0))
    }
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_.:/@#!&*|-".contains(c)
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Key {
    type Err = InvalidKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::new(s)
    }
}

impl TryFrom<&str> for Key {
    type Error = InvalidKeyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Key::new(value)
    }
}

impl TryFrom<String> for Key {
    type Error = InvalidKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Key::new(value)
    }
}

/// Decimal digits are always a valid key.
impl From<u64> for Key {
    fn from(value: u64) -> Self {
        Key(value.to_string())
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Key::new(raw).map_err(serde::de::Error::custom)
    }
}
