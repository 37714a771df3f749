//! JSON-file backed post store

use crate::model::PostRecord;
use crate::storage::json::{read_json_or_default, write_json_atomic};
use crate::storage::{KeyValueStore, StorageResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The persisted mapping of post identifier -> post record
///
/// The backing file is a single pretty-printed JSON object. It is rewritten in
/// full after every insertion.
#[derive(Debug)]
pub struct PostStore {
    path: PathBuf,
    posts: BTreeMap<String, PostRecord>,
}

impl PostStore {
    /// Creates an empty store that will be written to `path`
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            posts: BTreeMap::new(),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Iterates over all stored posts in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PostRecord)> {
        self.posts.iter()
    }
}

impl KeyValueStore for PostStore {
    type Value = PostRecord;

    fn load(path: &Path) -> Self {
        let posts: BTreeMap<String, PostRecord> = read_json_or_default(path, "post store");
        tracing::debug!("Loaded {} posts from {}", posts.len(), path.display());
        Self {
            path: path.to_path_buf(),
            posts,
        }
    }

    fn save(&self) -> StorageResult<()> {
        write_json_atomic(&self.path, &self.posts)
    }

    fn has(&self, key: &str) -> bool {
        self.posts.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<&PostRecord> {
        self.posts.get(key)
    }

    fn set(&mut self, key: String, value: PostRecord) -> StorageResult<()> {
        self.posts.insert(key, value);
        self.save()
    }

    fn len(&self) -> usize {
        self.posts.len()
    }
}
