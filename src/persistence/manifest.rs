//! Snapshot file manifest
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "created_at": "2026-02-04T11:30:00Z",
//!   "document_count": 42,
//!   "checksum": "crc32:deadbeef"
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::checksum::{compute_checksum, format_checksum, parse_checksum};

pub const FORMAT_VERSION: u8 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotManifest {
    pub format_version: u8,
    pub created_at: DateTime<Utc>,
    pub document_count: usize,
    /// CRC32 of the serialized document list (`crc32:XXXXXXXX`)
    pub checksum: String,
}

impl SnapshotManifest {
    /// Describes `document_count` documents serialized as `documents`.
    pub fn describe(document_count: usize, documents: &[u8]) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            created_at: Utc::now(),
            document_count,
            checksum: format_checksum(compute_checksum(documents)),
        }
    }

    /// Whether `documents` hashes to the recorded checksum.
    pub fn matches(&self, documents: &[u8]) -> bool {
        parse_checksum(&self.checksum) == Some(compute_checksum(documents))
    }
}
