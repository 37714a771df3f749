//! Storage traits and error types
//!
//! This module defines the key-value interface the crawl driver uses for
//! dedup checks and persistence, and the associated error types.

use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to replace file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Store schema is at version {found}, expected {expected}; run with --migrate first")]
    SchemaOutdated { found: u32, expected: u32 },

    #[error("Store is not a JSON object: {0}")]
    NotAnObject(String),

    #[error("Record '{key}' does not match the current schema: {source}")]
    InvalidRecord {
        key: String,
        source: serde_json::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable keyed storage with existence checks and full-document persistence
///
/// Implementations keep the whole mapping in memory and rewrite the backing
/// file on every `set`, so a crash loses at most the entry being written.
pub trait KeyValueStore {
    /// The record type stored under each key
    type Value;

    /// Loads the mapping from `path`
    ///
    /// A missing or unreadable file yields an empty store; loading never fails.
    fn load(path: &Path) -> Self
    where
        Self: Sized;

    /// Writes the full mapping to the backing file
    fn save(&self) -> StorageResult<()>;

    /// Returns true if `key` is present
    fn has(&self, key: &str) -> bool;

    /// Gets the value stored under `key`
    fn get(&self, key: &str) -> Option<&Self::Value>;

    /// Inserts `value` under `key` and persists immediately
    fn set(&mut self, key: String, value: Self::Value) -> StorageResult<()>;

    /// Number of stored entries
    fn len(&self) -> usize;

    /// Returns true if nothing is stored
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
