//! Output module for store summaries
//!
//! The crawl's real output is the post store itself; this module only reports
//! on it (`--stats`).

pub mod stats;

pub use stats::{load_statistics, print_statistics, summarize_posts, StoreStatistics};
