//! Bit-packing of dictionary IDs into one 64-bit key
//!
//! ```text
//! bits 63..48  namespace id     (16 bits)
//! bits 47..34  relationship id  (14 bits)
//! bits 33..0   resource id      (34 bits)
//! ```
//!
//! Packing is bijective within these widths. An ID that does not fit its
//! field is rejected with `EncodingError::Overflow`, never truncated.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{EncodingError, EncodingResult};
use crate::entity::Key;

const NAMESPACE_BITS: u32 = 16;
const RELATIONSHIP_BITS: u32 = 14;
const RESOURCE_BITS: u32 = 34;

const RELATIONSHIP_SHIFT: u32 = RESOURCE_BITS;
const NAMESPACE_SHIFT: u32 = RESOURCE_BITS + RELATIONSHIP_BITS;

const fn mask(bits: u32) -> u64 {
    (1u64 << bits) - 1
}

/// The three dictionaries behind a packed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dictionary {
    Namespace,
    Resource,
    Relationship,
}

impl Dictionary {
    pub const ALL: [Dictionary; 3] = [
        Dictionary::Namespace,
        Dictionary::Resource,
        Dictionary::Relationship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dictionary::Namespace => "encoding/namespace",
            Dictionary::Resource => "encoding/resource",
            Dictionary::Relationship => "encoding/relationship",
        }
    }

    /// Hash key of this dictionary's entries. Also names its ID counter.
    pub fn hash_key(&self) -> Key {
        Key::from_static(self.as_str())
    }

    /// Hash key of the reverse entry for `id`: `<dictionary>/<id>`, holding
    /// the value as its only range key.
    pub fn id_key(&self, id: u64) -> Key {
        self.hash_key().join(&Key::from(id))
    }

    /// Width of this dictionary's field in a packed key.
    pub fn bits(&self) -> u32 {
        match self {
            Dictionary::Namespace => NAMESPACE_BITS,
            Dictionary::Resource => RESOURCE_BITS,
            Dictionary::Relationship => RELATIONSHIP_BITS,
        }
    }

    /// Largest ID this dictionary can hand out.
    pub fn max_id(&self) -> u64 {
        mask(self.bits())
    }

    pub(crate) fn check(&self, id: u64) -> EncodingResult<u64> {
        if id > self.max_id() {
            return Err(EncodingError::Overflow {
                dictionary: *self,
                id,
                max: self.max_id(),
            });
        }
        Ok(id)
    }
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The dictionary IDs of one `(resource, relationship)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncodedIds {
    pub namespace_id: u64,
    pub relationship_id: u64,
    pub resource_id: u64,
}

/// Three dictionary IDs packed into one `u64`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackedKey(u64);

impl PackedKey {
    /// Packs `ids`, failing if any ID exceeds its field.
    pub fn pack(ids: EncodedIds) -> EncodingResult<Self> {
        let namespace = Dictionary::Namespace.check(ids.namespace_id)?;
        let relationship = Dictionary::Relationship.check(ids.relationship_id)?;
        let resource = Dictionary::Resource.check(ids.resource_id)?;

        Ok(Self(
            (namespace << NAMESPACE_SHIFT) | (relationship << RELATIONSHIP_SHIFT) | resource,
        ))
    }

    /// Splits back into the three IDs.
    pub fn unpack(&self) -> EncodedIds {
        EncodedIds {
            namespace_id: self.0 >> NAMESPACE_SHIFT,
            relationship_id: (self.0 >> RELATIONSHIP_SHIFT) & mask(RELATIONSHIP_BITS),
            resource_id: self.0 & mask(RESOURCE_BITS),
        }
    }

    #[inline]
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PackedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
