//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: where the crawl driver is in its discovery/fetch cycle
//! - `PostOutcome`: what happened to one discovered post
//! - `SkipReason`: why a post was not fetched

mod outcome;
mod phase;

// Re-export main types
pub use outcome::{PostOutcome, SkipReason};
pub use phase::CrawlPhase;
