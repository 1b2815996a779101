//! Entity value types
//!
//! - `Key` - validated, lower-cased identifier
//! - `Revision` - monotonic document version
//!
//! Both are immutable and compared by value.

mod errors;
mod key;
mod revision;

pub use errors::{InvalidKeyError, InvalidKeyReason};
pub use key::Key;
pub use revision::Revision;
