/// Crawl phase definitions
///
/// A run moves through these phases once per post, nested inside one pass
/// per sitemap:
///
/// ```text
/// Idle -> DiscoveringSitemaps -> { DiscoveringPosts -> { CheckSkip -> Extracting
///      -> Persisting -> Cooldown } } -> Done
/// ```
use std::fmt;

/// The current phase of the crawl driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Nothing started yet
    Idle,

    /// Reading the sitemap index
    DiscoveringSitemaps,

    /// Reading one second-level sitemap
    DiscoveringPosts,

    /// Deciding whether the next post needs fetching
    CheckSkip,

    /// Loading and extracting a post page
    Extracting,

    /// Writing the store (success) or the ignore ledger (failure)
    Persisting,

    /// Waiting between post fetches
    Cooldown,

    /// Every sitemap visited
    Done,
}

impl CrawlPhase {
    /// Returns true if the driver may move from `self` to `next`
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        match self {
            Idle => matches!(next, DiscoveringSitemaps),
            DiscoveringSitemaps => matches!(next, DiscoveringPosts | Done),
            // A sitemap may list no posts at all
            DiscoveringPosts => matches!(next, CheckSkip | DiscoveringPosts | Done),
            CheckSkip => matches!(next, Extracting | CheckSkip | DiscoveringPosts | Done),
            Extracting => matches!(next, Persisting),
            Persisting => matches!(next, Cooldown),
            Cooldown => matches!(next, CheckSkip | DiscoveringPosts | Done),
            Done => false,
        }
    }

    /// Returns true if the crawl has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::DiscoveringSitemaps => "discovering_sitemaps",
            Self::DiscoveringPosts => "discovering_posts",
            Self::CheckSkip => "check_skip",
            Self::Extracting => "extracting",
            Self::Persisting => "persisting",
            Self::Cooldown => "cooldown",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
