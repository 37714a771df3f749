//! Ignore ledger: identifiers that must never be fetched again

use crate::storage::json::{read_json_or_default, write_json_atomic};
use crate::storage::StorageResult;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Append-only list of identifiers excluded from future fetch attempts
///
/// Persisted as a JSON array in insertion order. Entries are never removed
/// during a run.
#[derive(Debug)]
pub struct IgnoreLedger {
    path: PathBuf,
    entries: Vec<String>,
    index: HashSet<String>,
}

impl IgnoreLedger {
    /// Loads the ledger from `path`, empty if absent or corrupt
    pub fn load(path: &Path) -> Self {
        let entries: Vec<String> = read_json_or_default(path, "ignore ledger");
        let mut ledger = Self {
            path: path.to_path_buf(),
            entries: Vec::with_capacity(entries.len()),
            index: HashSet::with_capacity(entries.len()),
        };
        for id in entries {
            ledger.push(id);
        }
        tracing::debug!(
            "Loaded {} ignored identifiers from {}",
            ledger.len(),
            path.display()
        );
        ledger
    }

    /// Overwrites the backing file with the current entries
    pub fn save(&self) -> StorageResult<()> {
        write_json_atomic(&self.path, &self.entries)
    }

    /// Appends `id` and persists the ledger
    ///
    /// Returns false (and writes nothing) if `id` was already present.
    pub fn record(&mut self, id: &str) -> StorageResult<bool> {
        if !self.push(id.to_string()) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Returns true if `id` is in the ledger
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, id: String) -> bool {
        if self.index.insert(id.clone()) {
            self.entries.push(id);
            true
        } else {
            false
        }
    }
}
