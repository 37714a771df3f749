//! Store schema migrations
//!
//! Older stores were produced with a different record shape: a free-text
//! description, genres as one comma-joined string, string dates, untrusted
//! preview images and digest posts mixed in with real ones. The migrations
//! below bring such a store up to the current shape. They run in version
//! order on the raw JSON document, since legacy records do not deserialize
//! into [`PostRecord`].
//!
//! The applied version is kept in the schema marker beside the store. A crawl
//! refuses to write into a store whose marker is behind
//! [`CURRENT_SCHEMA_VERSION`].

mod steps;

pub use steps::{Document, MigrationContext};

use crate::config::Config;
use crate::model::PostRecord;
use crate::storage::json::{read_json, write_json_atomic};
use crate::storage::{SchemaMarker, StorageError};
use crate::Result;
use serde_json::Value;
use std::path::Path;

/// One ordered store transform
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    apply: fn(&mut Document, &MigrationContext<'_>) -> usize,
}

/// Every migration, in the order it must run
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "drop-description",
        apply: steps::drop_description,
    },
    Migration {
        version: 2,
        name: "genres-to-list",
        apply: steps::genres_to_list,
    },
    Migration {
        version: 3,
        name: "created-at-to-epoch",
        apply: steps::created_at_to_epoch,
    },
    Migration {
        version: 4,
        name: "trusted-preview-images",
        apply: steps::trusted_preview_images,
    },
    Migration {
        version: 5,
        name: "purge-digest-posts",
        apply: steps::purge_digest_posts,
    },
];

/// Schema version written by this build
pub const CURRENT_SCHEMA_VERSION: u32 = 5;

/// The marker a fully migrated store carries
pub fn current_marker() -> SchemaMarker {
    SchemaMarker {
        version: CURRENT_SCHEMA_VERSION,
        applied: MIGRATIONS.iter().map(|m| m.name.to_string()).collect(),
    }
}

/// Migrations that a store at `version` still needs
pub fn pending(version: u32) -> impl Iterator<Item = &'static Migration> {
    MIGRATIONS.iter().filter(move |m| m.version > version)
}

/// One applied migration and how many records it touched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub version: u32,
    pub name: &'static str,
    pub changed: usize,
}

/// What a migration run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
    pub applied: Vec<AppliedMigration>,
    pub posts_before: usize,
    pub posts_after: usize,
}

impl MigrationReport {
    /// Returns true if the store was already current
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Applies every migration above `from_version` to `doc`
pub fn migrate_document(
    doc: &mut Document,
    from_version: u32,
    ctx: &MigrationContext<'_>,
) -> Vec<AppliedMigration> {
    pending(from_version)
        .map(|migration| {
            let changed = (migration.apply)(doc, ctx);
            tracing::info!(
                "Migration {} ({}) changed {} records",
                migration.version,
                migration.name,
                changed
            );
            AppliedMigration {
                version: migration.version,
                name: migration.name,
                changed,
            }
        })
        .collect()
}

/// Brings the configured store up to the current schema version
///
/// The store is rewritten only after every record validates against
/// [`PostRecord`]; the marker is stamped after the store is written.
pub fn run_migrations(config: &Config) -> Result<MigrationReport> {
    let store_path = Path::new(&config.output.store_path);
    let schema_path = Path::new(&config.output.schema_path);

    let marker = SchemaMarker::load(schema_path);
    let mut report = MigrationReport {
        from_version: marker.version,
        to_version: marker.version,
        ..MigrationReport::default()
    };

    if marker.version >= CURRENT_SCHEMA_VERSION {
        tracing::info!(
            "Store schema is at version {}, nothing to migrate",
            marker.version
        );
        return Ok(report);
    }

    let Some(raw) = read_json::<Value>(store_path)? else {
        tracing::info!(
            "No store at {}, stamping schema version {}",
            store_path.display(),
            CURRENT_SCHEMA_VERSION
        );
        current_marker().save(schema_path)?;
        report.to_version = CURRENT_SCHEMA_VERSION;
        return Ok(report);
    };

    let mut doc = match raw {
        Value::Object(doc) => doc,
        other => return Err(StorageError::NotAnObject(json_kind(&other).to_string()).into()),
    };
    report.posts_before = doc.len();

    let ctx = MigrationContext {
        trusted_preview_host: config.extract.trusted_preview_host.as_deref(),
        digest_title_marker: &config.extract.digest_title_marker,
        exclude_patterns: &config.site.exclude_patterns,
    };
    report.applied = migrate_document(&mut doc, marker.version, &ctx);
    report.posts_after = doc.len();

    validate_document(&doc)?;
    write_json_atomic(store_path, &doc)?;

    let mut applied = marker.applied;
    applied.extend(report.applied.iter().map(|m| m.name.to_string()));
    SchemaMarker {
        version: CURRENT_SCHEMA_VERSION,
        applied,
    }
    .save(schema_path)?;
    report.to_version = CURRENT_SCHEMA_VERSION;

    tracing::info!(
        "Migrated {} from version {} to {} ({} -> {} posts)",
        store_path.display(),
        report.from_version,
        report.to_version,
        report.posts_before,
        report.posts_after
    );
    Ok(report)
}

fn validate_document(doc: &Document) -> std::result::Result<(), StorageError> {
    for (key, value) in doc {
        serde_json::from_value::<PostRecord>(value.clone()).map_err(|source| {
            StorageError::InvalidRecord {
                key: key.clone(),
                source,
            }
        })?;
    }
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
