//! Statistics over the persisted store
//!
//! This module reads the store, the ignore ledger and the schema marker and
//! summarizes them for `--stats`. The store is read as raw JSON, so a store
//! that still needs migrating can be counted too.

use crate::config::Config;
use crate::model::PostRecord;
use crate::storage::json::read_json;
use crate::storage::{IgnoreLedger, SchemaMarker};
use crate::Result;
use chrono::{Local, TimeZone};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

/// How many genres `--stats` lists
const TOP_GENRES: usize = 10;

/// Store statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatistics {
    /// Number of records in the store
    pub total_posts: usize,

    /// Number of identifiers in the ignore ledger
    pub ignored_posts: usize,

    /// Schema version from the marker (0 when unversioned)
    pub schema_version: u32,

    /// Records that do not deserialize with the current schema
    pub unreadable_posts: usize,

    /// Records without a creation date
    pub posts_without_date: usize,

    /// Records without a cover image
    pub posts_without_image: usize,

    /// Earliest and latest creation date, in epoch milliseconds
    pub date_range: Option<(i64, i64)>,

    /// Most common genres with their counts, most frequent first
    pub top_genres: Vec<(String, usize)>,
}

/// Loads statistics for the store named in `config`
pub fn load_statistics(config: &Config) -> Result<StoreStatistics> {
    let store_path = Path::new(&config.output.store_path);
    let raw: Map<String, Value> = read_json(store_path)?.unwrap_or_default();
    let ledger = IgnoreLedger::load(Path::new(&config.output.ignore_path));
    let marker = SchemaMarker::load(Path::new(&config.output.schema_path));

    let mut stats = StoreStatistics {
        total_posts: raw.len(),
        ignored_posts: ledger.len(),
        schema_version: marker.version,
        ..StoreStatistics::default()
    };

    let mut posts = Vec::with_capacity(raw.len());
    for (key, value) in raw {
        match serde_json::from_value::<PostRecord>(value) {
            Ok(post) => posts.push(post),
            Err(e) => {
                tracing::debug!("Record '{}' does not match the current schema: {}", key, e);
                stats.unreadable_posts += 1;
            }
        }
    }
    summarize_posts(&mut stats, &posts);

    Ok(stats)
}

/// Fills the per-record counters of `stats` from `posts`
pub fn summarize_posts(stats: &mut StoreStatistics, posts: &[PostRecord]) {
    let mut genre_counts: HashMap<&str, usize> = HashMap::new();

    for post in posts {
        match post.created_at {
            Some(ms) => {
                stats.date_range = Some(match stats.date_range {
                    Some((min, max)) => (min.min(ms), max.max(ms)),
                    None => (ms, ms),
                });
            }
            None => stats.posts_without_date += 1,
        }

        if post.image.is_none() {
            stats.posts_without_image += 1;
        }

        for genre in post.genres().unwrap_or_default() {
            *genre_counts.entry(genre.as_str()).or_insert(0) += 1;
        }
    }

    let mut genres: Vec<(String, usize)> = genre_counts
        .into_iter()
        .map(|(genre, count)| (genre.to_string(), count))
        .collect();
    // Ties broken alphabetically so output is stable
    genres.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    genres.truncate(TOP_GENRES);
    stats.top_genres = genres;
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Store Statistics ===\n");

    println!("Overview:");
    println!("  Posts stored: {}", stats.total_posts);
    println!("  Identifiers ignored: {}", stats.ignored_posts);
    println!("  Schema version: {}", stats.schema_version);
    if stats.unreadable_posts > 0 {
        println!(
            "  Records needing migration: {} (run with --migrate)",
            stats.unreadable_posts
        );
    }
    println!();

    println!("Completeness:");
    println!("  Without date: {}", stats.posts_without_date);
    println!("  Without image: {}", stats.posts_without_image);
    if let Some((oldest, newest)) = stats.date_range {
        println!("  Oldest post: {}", format_date(oldest));
        println!("  Newest post: {}", format_date(newest));
    }
    println!();

    if !stats.top_genres.is_empty() {
        println!("Top Genres:");
        for (genre, count) in &stats.top_genres {
            let percentage = if stats.total_posts > 0 {
                (*count as f64 / stats.total_posts as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", genre, count, percentage);
        }
    }
}

fn format_date(ms: i64) -> String {
    match Local.timestamp_millis_opt(ms).single() {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => ms.to_string(),
    }
}
