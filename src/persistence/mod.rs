//! Snapshot files
//!
//! An index is persisted as one JSON file holding a manifest and the
//! ordered document list:
//!
//! ```json
//! {
//!   "manifest": {
//!     "format_version": 1,
//!     "created_at": "...",
//!     "document_count": 2,
//!     "checksum": "crc32:..."
//!   },
//!   "documents": [ { "hash_key": "...", "range_key": "...", "version": "0", "payload": 1 }, ... ]
//! }
//! ```
//!
//! Writes go to `<file>.tmp` and are renamed into place, so a reader sees
//! either the previous file or the complete new one. Loads verify the format
//! version, checksum and document count before any document is trusted.

mod checksum;
mod errors;
mod manifest;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::StoreConfig;
use crate::document::Document;
use crate::index::{DocumentKey, Index, Snapshot};
use crate::observability::{log_event, Event};

pub use checksum::{compute_checksum, format_checksum, parse_checksum};
pub use errors::{PersistenceError, PersistenceResult};
pub use manifest::{SnapshotManifest, FORMAT_VERSION};

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    manifest: SnapshotManifest,
    documents: Value,
}

/// Writes `snapshot` to `path`, replacing any previous file.
pub fn save_snapshot<H, R, P>(
    path: &Path,
    snapshot: &Snapshot<H, R, P>,
) -> PersistenceResult<SnapshotManifest>
where
    H: DocumentKey + Serialize,
    R: DocumentKey + Serialize,
    P: Serialize,
{
    let documents: Vec<&Document<H, R, P>> = snapshot.documents().map(|doc| &**doc).collect();
    let documents = serde_json::to_value(&documents)?;
    let manifest = SnapshotManifest::describe(snapshot.len(), &serde_json::to_vec(&documents)?);

    let file = SnapshotFile {
        manifest,
        documents,
    };
    write_atomically(path, &serde_json::to_vec_pretty(&file)?)?;

    log_event(
        Event::SnapshotSaved,
        &[
            ("path", &path.display().to_string()),
            ("documents", &file.manifest.document_count.to_string()),
            ("checksum", &file.manifest.checksum),
        ],
    );
    Ok(file.manifest)
}

/// Reads and verifies the snapshot at `path`.
pub fn load_snapshot<H, R, P>(path: &Path) -> PersistenceResult<Snapshot<H, R, P>>
where
    H: DocumentKey + DeserializeOwned,
    R: DocumentKey + DeserializeOwned,
    P: DeserializeOwned,
{
    let bytes = fs::read(path).map_err(|e| PersistenceError::io(path, e))?;
    let file: SnapshotFile = serde_json::from_slice(&bytes)
        .map_err(|e| reject(PersistenceError::corrupted(path, e.to_string())))?;

    if file.manifest.format_version != FORMAT_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            path: path.to_path_buf(),
            version: file.manifest.format_version,
        });
    }

    if !file.manifest.matches(&serde_json::to_vec(&file.documents)?) {
        return Err(reject(PersistenceError::corrupted(
            path,
            format!("checksum mismatch, manifest records {}", file.manifest.checksum),
        )));
    }

    let documents: Vec<Document<H, R, P>> = serde_json::from_value(file.documents)
        .map_err(|e| reject(PersistenceError::corrupted(path, e.to_string())))?;

    if documents.len() != file.manifest.document_count {
        return Err(reject(PersistenceError::corrupted(
            path,
            format!(
                "manifest records {} documents, file holds {}",
                file.manifest.document_count,
                documents.len()
            ),
        )));
    }

    let snapshot = Snapshot::from_documents(documents).map_err(|dup| {
        PersistenceError::DuplicateDocument {
            path: path.to_path_buf(),
            key: format!("hash={:?} range={:?}", dup.hash_key(), dup.range_key()),
        }
    })?;

    log_event(
        Event::SnapshotLoaded,
        &[
            ("path", &path.display().to_string()),
            ("documents", &snapshot.len().to_string()),
        ],
    );
    Ok(snapshot)
}

/// Like `load_snapshot`, but a missing file is an empty snapshot.
pub fn load_or_empty<H, R, P>(path: &Path) -> PersistenceResult<Snapshot<H, R, P>>
where
    H: DocumentKey + DeserializeOwned,
    R: DocumentKey + DeserializeOwned,
    P: DeserializeOwned,
{
    if !path.exists() {
        return Ok(Snapshot::new());
    }
    load_snapshot(path)
}

/// Writes the current snapshot of `index`.
pub fn save_index<H, R, P>(
    path: &Path,
    index: &Index<H, R, P>,
) -> PersistenceResult<SnapshotManifest>
where
    H: DocumentKey + Serialize,
    R: DocumentKey + Serialize,
    P: Serialize,
{
    save_snapshot(path, &index.snapshot())
}

/// Opens an index over the snapshot at `path` (empty if absent).
pub fn open_index<H, R, P>(
    path: &Path,
    config: &StoreConfig,
) -> PersistenceResult<Index<H, R, P>>
where
    H: DocumentKey + DeserializeOwned,
    R: DocumentKey + DeserializeOwned,
    P: DeserializeOwned,
{
    let snapshot = load_or_empty(path)?;
    Ok(Index::from_snapshot(snapshot).with_backoff(config.backoff))
}

fn reject(err: PersistenceError) -> PersistenceError {
    if let PersistenceError::Corrupted { path, reason } = &err {
        log_event(
            Event::SnapshotCorrupted,
            &[("path", &path.display().to_string()), ("reason", reason)],
        );
    }
    err
}

fn write_atomically(path: &Path, bytes: &[u8]) -> PersistenceResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))?;
    }

    let tmp = temp_path(path);
    let mut file = File::create(&tmp).map_err(|e| PersistenceError::io(&tmp, e))?;
    file.write_all(bytes)
        .map_err(|e| PersistenceError::io(&tmp, e))?;
    file.sync_all().map_err(|e| PersistenceError::io(&tmp, e))?;
    drop(file);

    fs::rename(&tmp, path).map_err(|e| PersistenceError::io(path, e))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
