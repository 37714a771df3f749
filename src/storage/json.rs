//! JSON file helpers shared by the store, the ledger and the schema marker

use crate::storage::StorageResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Reads and parses a JSON file
///
/// Returns `Ok(None)` when the file does not exist.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// Reads a JSON file, falling back to `T::default()` when it is absent or corrupt
///
/// Corruption is logged at error level: falling back discards whatever the
/// file held, and the next save overwrites it.
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path, what: &str) -> T {
    match read_json(path) {
        Ok(Some(value)) => value,
        Ok(None) => {
            tracing::info!("No {} at {}, starting empty", what, path.display());
            T::default()
        }
        Err(e) => {
            tracing::error!(
                "Could not read {} at {} ({}); starting empty, previous contents will be overwritten",
                what,
                path.display(),
                e
            );
            T::default()
        }
    }
}

/// Writes `value` as pretty JSON, replacing `path` in one step
///
/// The document goes to a temporary file in the same directory, is synced, and
/// is then renamed over the target, so readers never observe a truncated file.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}
