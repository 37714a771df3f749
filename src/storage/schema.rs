//! Schema version marker kept beside the post store
//!
//! The store file itself stays a plain identifier -> record object, so the
//! version lives in a small sidecar document:
//!
//! ```json
//! { "version": 5, "applied": ["drop-description", "..."] }
//! ```

use crate::storage::json::{read_json, write_json_atomic};
use crate::storage::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which migrations have been applied to a store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMarker {
    pub version: u32,
    #[serde(default)]
    pub applied: Vec<String>,
}

impl SchemaMarker {
    /// Loads the marker at `path`
    ///
    /// An absent or unreadable marker reads as version 0, which forces every
    /// migration to run again. Migrations tolerate already-migrated records.
    pub fn load(path: &Path) -> Self {
        match read_json(path) {
            Ok(Some(marker)) => marker,
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::error!(
                    "Could not read schema marker at {} ({}); treating store as unversioned",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Writes the marker
    pub fn save(&self, path: &Path) -> StorageResult<()> {
        write_json_atomic(path, self)
    }
}

/// Makes sure the store at `store_path` can be crawled into
///
/// A store that does not exist yet is stamped with `current`. An existing store
/// whose marker is behind `current` is rejected with `SchemaOutdated`.
pub fn check_schema(
    store_path: &Path,
    schema_path: &Path,
    current: &SchemaMarker,
) -> StorageResult<()> {
    if !store_path.exists() {
        tracing::debug!(
            "New store at {}, stamping schema version {}",
            store_path.display(),
            current.version
        );
        return current.save(schema_path);
    }

    let marker = SchemaMarker::load(schema_path);
    if marker.version < current.version {
        return Err(StorageError::SchemaOutdated {
            found: marker.version,
            expected: current.version,
        });
    }

    Ok(())
}
