//! Individual store migrations
//!
//! Each step rewrites the raw store document in place and returns how many
//! records it touched. Steps tolerate records that are already in the target
//! shape, so re-running one is harmless.

use crate::extract::{parse_date, split_genres};
use crate::model::{GENRES_KEY, RAW_GENRES_KEY};
use serde_json::{Map, Value};

/// Settings the steps read from the active configuration
#[derive(Debug, Clone, Copy)]
pub struct MigrationContext<'a> {
    pub trusted_preview_host: Option<&'a str>,
    pub digest_title_marker: &'a str,
    pub exclude_patterns: &'a [String],
}

pub type Document = Map<String, Value>;

/// Iterates over records that are JSON objects; anything else is left for validation
fn records_mut(doc: &mut Document) -> impl Iterator<Item = (&String, &mut Map<String, Value>)> {
    doc.iter_mut()
        .filter_map(|(key, value)| value.as_object_mut().map(|record| (key, record)))
}

/// Removes the legacy free-text `description` field
pub(crate) fn drop_description(doc: &mut Document, _ctx: &MigrationContext<'_>) -> usize {
    records_mut(doc)
        .filter_map(|(_, record)| record.remove("description"))
        .count()
}

/// Replaces the raw `Genres/Tags` value with a `genres` list
///
/// Older stores hold either one comma-joined string or a list of such strings;
/// both are split into individual genres.
pub(crate) fn genres_to_list(doc: &mut Document, _ctx: &MigrationContext<'_>) -> usize {
    let mut changed = 0;
    for (_, record) in records_mut(doc) {
        let Some(info) = record.get_mut("info").and_then(Value::as_object_mut) else {
            continue;
        };
        let Some(raw) = info.remove(RAW_GENRES_KEY) else {
            continue;
        };

        let genres = match raw {
            Value::String(text) => Value::from(split_genres(&text)),
            Value::Array(items) => Value::from(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .flat_map(split_genres)
                    .collect::<Vec<String>>(),
            ),
            _ => continue,
        };
        info.insert(GENRES_KEY.to_string(), genres);
        changed += 1;
    }
    changed
}

/// Converts string `createdAt` values to epoch milliseconds
///
/// Unparseable strings become `null`. Fractional numbers are truncated.
pub(crate) fn created_at_to_epoch(doc: &mut Document, _ctx: &MigrationContext<'_>) -> usize {
    let mut changed = 0;
    for (key, record) in records_mut(doc) {
        let Some(created_at) = record.get_mut("createdAt") else {
            continue;
        };

        let converted = match created_at {
            Value::String(text) => match parse_date(text) {
                Some(ms) => Value::from(ms),
                None => {
                    tracing::warn!("{}: unparseable createdAt '{}', clearing it", key, text);
                    Value::Null
                }
            },
            Value::Number(n) if !n.is_i64() => match n.as_f64() {
                Some(ms) => Value::from(ms as i64),
                None => Value::Null,
            },
            _ => continue,
        };
        *created_at = converted;
        changed += 1;
    }
    changed
}

/// Keeps only preview images hosted on the trusted host
pub(crate) fn trusted_preview_images(doc: &mut Document, ctx: &MigrationContext<'_>) -> usize {
    let Some(host) = ctx.trusted_preview_host else {
        tracing::info!("No trusted preview host configured, leaving preview images as they are");
        return 0;
    };

    let mut changed = 0;
    for (_, record) in records_mut(doc) {
        let Some(previews) = record.get_mut("previewImages").and_then(Value::as_array_mut) else {
            continue;
        };
        let before = previews.len();
        previews.retain(|p| p.as_str().is_some_and(|src| src.contains(host)));
        if previews.len() != before {
            changed += 1;
        }
    }
    changed
}

/// Removes digest posts: titles with the digest marker or excluded identifiers
pub(crate) fn purge_digest_posts(doc: &mut Document, ctx: &MigrationContext<'_>) -> usize {
    let before = doc.len();
    doc.retain(|key, record| {
        let digest_title = record
            .get("title")
            .and_then(Value::as_str)
            .is_some_and(|title| title.contains(ctx.digest_title_marker));
        let excluded = ctx
            .exclude_patterns
            .iter()
            .any(|pattern| key.contains(pattern.as_str()));

        if digest_title || excluded {
            tracing::debug!("Removing digest post '{}'", key);
        }
        !(digest_title || excluded)
    });
    before - doc.len()
}
