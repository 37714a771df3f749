//! Storage module for persisting crawl progress
//!
//! This module owns the two JSON documents a crawl produces:
//! - the post store (identifier -> post record), rewritten after every scrape
//! - the ignore ledger (identifiers never to fetch again), rewritten on failure
//!
//! plus the schema marker that records which migrations the store has seen.
//! Every write goes through a temp-file-then-rename, so an external reader
//! never observes truncated JSON.

pub mod json;
mod ledger;
mod schema;
mod store;
mod traits;

pub use ledger::IgnoreLedger;
pub use schema::{check_schema, SchemaMarker};
pub use store::PostStore;
pub use traits::{KeyValueStore, StorageError, StorageResult};
