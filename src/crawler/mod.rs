//! Crawl driver
//!
//! This module contains the crawl loop and the rules it applies per post:
//! - skip policy (dedup against the store and ignore ledger, exclusions)
//! - sequential extraction with a fixed cooldown between fetches
//! - run counters

mod coordinator;
mod policy;
mod report;

pub use coordinator::{run_crawl, Coordinator};
pub use policy::SkipPolicy;
pub use report::CrawlReport;
