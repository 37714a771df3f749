//! Dedup and skip policy
//!
//! Decides, before any fetch, whether a discovered post needs work. Re-running
//! a crawl never re-fetches an identifier that was scraped, that failed, or
//! that matches an exclusion pattern.

use crate::state::SkipReason;
use crate::storage::{IgnoreLedger, KeyValueStore};

/// Static skip rules plus the dedup check against persisted state
#[derive(Debug, Clone, Default)]
pub struct SkipPolicy {
    exclude_patterns: Vec<String>,
}

impl SkipPolicy {
    pub fn new(exclude_patterns: Vec<String>) -> Self {
        Self { exclude_patterns }
    }

    /// Returns the reason to skip `id`, or None if it should be fetched
    ///
    /// Rules are checked in order: empty identifier, ignore ledger, exclusion
    /// pattern, already stored.
    pub fn check<S: KeyValueStore>(
        &self,
        id: &str,
        store: &S,
        ledger: &IgnoreLedger,
    ) -> Option<SkipReason> {
        if id.is_empty() {
            return Some(SkipReason::EmptyIdentifier);
        }

        if ledger.contains(id) {
            return Some(SkipReason::Ignored);
        }

        if let Some(pattern) = self.matching_exclusion(id) {
            return Some(SkipReason::Excluded(pattern.to_string()));
        }

        if store.has(id) {
            return Some(SkipReason::AlreadyStored);
        }

        None
    }

    /// Returns the first exclusion pattern contained in `id`
    pub fn matching_exclusion(&self, id: &str) -> Option<&str> {
        self.exclude_patterns
            .iter()
            .find(|pattern| id.contains(pattern.as_str()))
            .map(String::as_str)
    }
}
