use serde::Deserialize;

/// Main configuration structure for Sitemap-Harvest
///
/// Every table is optional; omitted keys fall back to the built-in defaults,
/// so an empty file (or no file at all) crawls the default site.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub extract: ExtractConfig,
}

/// The site being harvested
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Site root, without trailing slash (e.g. "https://example.com")
    pub base_url: String,

    /// Path of the root sitemap index relative to `base_url`
    pub sitemap_index_path: String,

    /// Substring a second-level sitemap URL must contain to be visited
    pub sitemap_marker: String,

    /// Identifiers containing any of these substrings are never fetched
    pub exclude_patterns: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://fitgirl-repacks.site".to_string(),
            sitemap_index_path: "/sitemap_index.xml".to_string(),
            sitemap_marker: "post-sitemap".to_string(),
            exclude_patterns: vec!["updates-digest".to_string()],
        }
    }
}

/// Which rendering engine backs page loads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// Plain HTTP fetch + HTML parse
    #[default]
    Static,
    /// Headless Chromium (requires the `chromium` feature)
    Chromium,
}

/// When a navigation counts as finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WaitUntil {
    /// The load event fired
    Load,
    /// No network activity for a short window after load
    #[default]
    NetworkIdle,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Pause after every post fetch attempt (milliseconds)
    pub delay_ms: u64,

    /// Upper bound for a single page navigation (milliseconds)
    pub navigation_timeout_ms: u64,

    /// Navigation wait condition
    pub wait_until: WaitUntil,

    /// Rendering engine backend
    pub engine: EngineKind,

    /// Run the browser without a window (chromium engine only)
    pub headless: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            delay_ms: 5_000,
            navigation_timeout_ms: 60_000,
            wait_until: WaitUntil::NetworkIdle,
            engine: EngineKind::Static,
            headless: true,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SitemapHarvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(url) => format!("{}/{} (+{})", self.crawler_name, self.crawler_version, url),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// JSON object of identifier -> post record
    pub store_path: String,

    /// JSON array of identifiers never to fetch again
    pub ignore_path: String,

    /// Sidecar file recording the store's schema version
    pub schema_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            store_path: "scraped_data.json".to_string(),
            ignore_path: "ignored.json".to_string(),
            schema_path: "scraped_data.schema.json".to_string(),
        }
    }
}

/// Field extraction and maintenance options
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExtractConfig {
    /// Keep only preview images whose URL contains this host
    pub trusted_preview_host: Option<String>,

    /// Titles containing this marker are digest posts, purged by migration
    pub digest_title_marker: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            trusted_preview_host: None,
            digest_title_marker: "Updates Digest".to_string(),
        }
    }
}
