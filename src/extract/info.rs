//! Key/value info block parsing
//!
//! A post's info block is a run of `Key: value` lines separated by line
//! breaks. Lines that do not match are dropped.

use crate::model::{InfoValue, GENRES_KEY, RAW_GENRES_KEY};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static INFO_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([^:]+?)\s*:\s*(.*?)\s*$").expect("info line pattern is valid")
});

/// Separator between items on the genre line
const GENRE_SEPARATOR: &str = ", ";

/// Parses one info block into a key -> value map
///
/// `Genres/Tags` is stored under `genres` as a list; every other key is kept
/// verbatim with a scalar value. When a key repeats, the last value wins.
pub fn parse_info_block(text: &str) -> BTreeMap<String, InfoValue> {
    let mut info = BTreeMap::new();
    merge_info_block(&mut info, text);
    info
}

/// Parses `text` into `info`, replacing values of keys already present
pub fn merge_info_block(info: &mut BTreeMap<String, InfoValue>, text: &str) {
    for line in text.lines() {
        let Some((key, value)) = parse_info_line(line) else {
            continue;
        };
        info.insert(key, value);
    }
}

/// Parses a single `Key: value` line
fn parse_info_line(line: &str) -> Option<(String, InfoValue)> {
    let captures = INFO_LINE.captures(line)?;
    let key = captures.get(1)?.as_str();
    let value = captures.get(2)?.as_str();
    if key.is_empty() || value.is_empty() {
        return None;
    }

    if key == RAW_GENRES_KEY {
        return Some((GENRES_KEY.to_string(), InfoValue::List(split_genres(value))));
    }

    Some((key.to_string(), InfoValue::Scalar(value.to_string())))
}

/// Splits a genre line into its items
pub fn split_genres(value: &str) -> Vec<String> {
    value
        .split(GENRE_SEPARATOR)
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}
