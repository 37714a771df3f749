/// Post record definitions
///
/// A record is created once, when a post page is extracted successfully, and is
/// only rewritten afterwards by schema migrations.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One value in a post's key/value info block
///
/// Most info lines carry a single string; a few known keys (genres) are split
/// into an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InfoValue {
    Scalar(String),
    List(Vec<String>),
}

impl InfoValue {
    /// Returns the scalar string, if this is a scalar
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// Returns the list items, if this is a list
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Scalar(_) => None,
            Self::List(items) => Some(items),
        }
    }
}

impl fmt::Display for InfoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{}", s),
            Self::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

/// A structured record extracted from one post page
///
/// Every field extracted from the page is optional: a template change that
/// removes an element shows up as `None`/empty here and in the extractor's
/// missing-field report, never as a fabricated empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub title: Option<String>,

    pub image: Option<String>,

    #[serde(default)]
    pub info: BTreeMap<String, InfoValue>,

    #[serde(default)]
    pub preview_images: Vec<String>,

    /// Creation time as epoch milliseconds
    pub created_at: Option<i64>,
}

impl PostRecord {
    /// Genres list, if the info block carried one
    pub fn genres(&self) -> Option<&[String]> {
        self.info.get(super::GENRES_KEY).and_then(InfoValue::as_list)
    }
}
