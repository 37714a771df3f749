//! Crawl run counters

use crate::state::PostOutcome;
use std::collections::BTreeMap;
use std::fmt;

/// Counts of what one crawl run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Second-level sitemaps read
    pub sitemaps_visited: usize,

    /// Post URLs found across all sitemaps
    pub posts_discovered: usize,

    /// Posts extracted and stored
    pub scraped: usize,

    /// Posts whose fetch or extraction failed
    pub failed: usize,

    /// Skipped posts by reason label
    pub skipped: BTreeMap<&'static str, usize>,
}

impl CrawlReport {
    /// Adds one post outcome to the counters
    pub fn record(&mut self, outcome: &PostOutcome) {
        match outcome {
            PostOutcome::Scraped => self.scraped += 1,
            PostOutcome::Failed(_) => self.failed += 1,
            PostOutcome::Skipped(reason) => *self.skipped.entry(reason.label()).or_insert(0) += 1,
        }
    }

    /// Total skipped posts across all reasons
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    /// Number of page fetches performed for posts
    pub fn fetched(&self) -> usize {
        self.scraped + self.failed
    }
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sitemaps, {} posts discovered, {} scraped, {} failed, {} skipped",
            self.sitemaps_visited,
            self.posts_discovered,
            self.scraped,
            self.failed,
            self.skipped_total()
        )?;
        if !self.skipped.is_empty() {
            let parts: Vec<String> = self
                .skipped
                .iter()
                .map(|(label, count)| format!("{}={}", label, count))
                .collect();
            write!(f, " ({})", parts.join(", "))?;
        }
        Ok(())
    }
}
