//! Key encoding
//!
//! Turns `(resource, relationship)` pairs into compact `u64` keys: each name
//! is dictionary-encoded to a small integer, and the three integers are
//! bit-packed into one word. Dictionaries and their ID counters are ordinary
//! documents in the store.

mod encoder;
mod errors;
mod packing;

pub use encoder::{DictionaryIndex, KeyEncoder, Resource};
pub use errors::{EncodingError, EncodingResult};
pub use packing::{Dictionary, EncodedIds, PackedKey};
