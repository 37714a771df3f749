//! Data model for harvested posts
//!
//! - `PostRecord`: one extracted post, keyed in the store by its identifier
//! - `InfoValue`: a single key/value info entry (scalar or list)

mod post;

pub use post::{InfoValue, PostRecord};

/// Info key under which the genre list is stored
pub const GENRES_KEY: &str = "genres";

/// Info key the site uses for the comma-separated genre line
pub const RAW_GENRES_KEY: &str = "Genres/Tags";
