//! Per-post outcomes

use std::fmt;

/// Why a discovered post was not fetched
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The URL was the site root (nothing left after stripping the base)
    EmptyIdentifier,

    /// The identifier is in the ignore ledger
    Ignored,

    /// The identifier contains a configured exclusion pattern
    Excluded(String),

    /// The store already holds a record for the identifier
    AlreadyStored,
}

impl SkipReason {
    /// Short label used in logs and crawl reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::EmptyIdentifier => "empty",
            Self::Ignored => "ignored",
            Self::Excluded(_) => "excluded",
            Self::AlreadyStored => "already_stored",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyIdentifier => write!(f, "empty identifier"),
            Self::Ignored => write!(f, "in ignore ledger"),
            Self::Excluded(pattern) => write!(f, "matches exclusion '{}'", pattern),
            Self::AlreadyStored => write!(f, "already scraped"),
        }
    }
}

/// What happened to one discovered post
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    /// Extracted and written to the store
    Scraped,

    /// Not fetched
    Skipped(SkipReason),

    /// Fetch or extraction failed; the identifier went to the ignore ledger
    Failed(String),
}

impl PostOutcome {
    /// Returns true if a page was fetched (successfully or not)
    pub fn was_fetched(&self) -> bool {
        matches!(self, Self::Scraped | Self::Failed(_))
    }
}
