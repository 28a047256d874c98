//! Store snapshot persistence
//!
//! A snapshot is a single JSON document:
//!
//! ```json
//! {
//!   "meta": {
//!     "created_at": "2026-08-25T11:30:00Z",
//!     "source": "https://nb.example.com",
//!     "record_count": 1234,
//!     "format_version": 1
//!   },
//!   "checksum": "crc32:deadbeef",
//!   "store": { "dcim": { "devices": { "1": { ... } } } }
//! }
//! ```
//!
//! The checksum is CRC32 over the canonical serialization of the store
//! payload and is verified on load. The engine tolerates being handed a
//! store pre-populated from any snapshot that passes verification.

use std::fs;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{StoreError, StoreResult};
use super::RecordStore;

/// Snapshot status/metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotMeta {
    /// Creation timestamp, RFC 3339
    pub created_at: String,
    /// Origin of the data (API base URL or tool name)
    pub source: String,
    /// Total records across all buckets at write time
    pub record_count: u64,
    /// Snapshot document format version
    pub format_version: u8,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotDocument {
    meta: SnapshotMeta,
    checksum: String,
    store: RecordStore,
}

/// Compute the formatted CRC32 checksum of a store's canonical serialization
fn store_checksum(store: &RecordStore) -> StoreResult<String> {
    let payload = serde_json::to_vec(store).map_err(|e| StoreError::Serialize(e.to_string()))?;
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&payload);
    Ok(format!("crc32:{:08x}", hasher.finalize()))
}

/// Write a store snapshot to `path`
pub fn write_snapshot(store: &RecordStore, path: &Path, source: &str) -> StoreResult<SnapshotMeta> {
    let meta = SnapshotMeta {
        created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        source: source.to_string(),
        record_count: store.record_count(),
        format_version: 1,
    };
    let document = SnapshotDocument {
        meta: meta.clone(),
        checksum: store_checksum(store)?,
        store: store.clone(),
    };

    let body = serde_json::to_string_pretty(&document)
        .map_err(|e| StoreError::Serialize(e.to_string()))?;
    fs::write(path, body).map_err(|e| StoreError::io(path, e))?;
    Ok(meta)
}

/// Load a store snapshot from `path`, verifying the checksum
pub fn load_snapshot(path: &Path) -> StoreResult<(RecordStore, SnapshotMeta)> {
    let body = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let document: SnapshotDocument =
        serde_json::from_str(&body).map_err(|e| StoreError::corrupt(path, e.to_string()))?;

    let computed = store_checksum(&document.store)?;
    if computed != document.checksum {
        return Err(StoreError::ChecksumMismatch {
            expected: document.checksum,
            computed,
        });
    }
    Ok((document.store, document.meta))
}
