//! Crawler coordinator - the sequential crawl loop
//!
//! One run walks the sitemap index, then every matching sitemap, then every
//! post URL in it. For each post the coordinator checks the skip policy,
//! extracts the page, persists the result, and cools down before the next
//! fetch. Progress is written to disk after every post, so a run interrupted at
//! any point resumes by re-running.

use crate::config::Config;
use crate::crawler::policy::SkipPolicy;
use crate::crawler::report::CrawlReport;
use crate::discovery::LinkDiscovery;
use crate::extract::Extractor;
use crate::migrate;
use crate::renderer::{self, Browser, Page};
use crate::state::{CrawlPhase, PostOutcome};
use crate::storage::{check_schema, IgnoreLedger, KeyValueStore, PostStore};
use crate::url::{post_identifier, post_url, sitemap_index_url};
use crate::{HarvestError, Result};
use std::path::Path;
use std::time::Duration;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    store: PostStore,
    ledger: IgnoreLedger,
    policy: SkipPolicy,
    discovery: LinkDiscovery,
    extractor: Extractor,
    delay: Duration,
    phase: CrawlPhase,
    report: CrawlReport,
}

impl Coordinator {
    /// Creates a coordinator and loads persisted progress
    ///
    /// Fails with `SchemaOutdated` if an existing store predates the current
    /// schema version. A store that does not exist yet is stamped current.
    pub fn new(config: Config) -> Result<Self> {
        let store_path = Path::new(&config.output.store_path);
        let schema_path = Path::new(&config.output.schema_path);
        check_schema(store_path, schema_path, &migrate::current_marker())?;

        let store = PostStore::load(store_path);
        let ledger = IgnoreLedger::load(Path::new(&config.output.ignore_path));
        tracing::info!(
            "Loaded {} stored posts and {} ignored identifiers",
            store.len(),
            ledger.len()
        );

        Ok(Self {
            policy: SkipPolicy::new(config.site.exclude_patterns.clone()),
            discovery: LinkDiscovery::new(&config.crawler),
            extractor: Extractor::new(&config.crawler, &config.extract),
            delay: Duration::from_millis(config.crawler.delay_ms),
            phase: CrawlPhase::Idle,
            report: CrawlReport::default(),
            store,
            ledger,
            config,
        })
    }

    /// The post store as of the last persisted write
    pub fn store(&self) -> &PostStore {
        &self.store
    }

    pub fn ledger(&self) -> &IgnoreLedger {
        &self.ledger
    }

    /// Current crawl phase
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Launches the configured rendering engine and runs the crawl with it
    pub async fn run(&mut self) -> Result<CrawlReport> {
        let browser = renderer::launch(&self.config.crawler, &self.config.user_agent).await?;
        self.run_with_engine(browser).await
    }

    /// Runs the crawl with `browser` and then releases it
    ///
    /// The engine is closed whether the crawl succeeds or fails.
    pub async fn run_with_engine(&mut self, mut browser: Box<dyn Browser>) -> Result<CrawlReport> {
        let result = self.run_with_browser(browser.as_ref()).await;

        if let Err(e) = browser.close().await {
            tracing::warn!("Failed to close rendering engine: {}", e);
        }

        result
    }

    /// Runs one full crawl using an already launched engine
    ///
    /// Sitemap discovery failures abort the run. Per-post failures are recorded
    /// in the ignore ledger and the run continues.
    pub async fn run_with_browser(&mut self, browser: &dyn Browser) -> Result<CrawlReport> {
        // Each run starts over from Idle; persisted state carries the progress
        self.phase = CrawlPhase::Idle;
        self.report = CrawlReport::default();
        let start_time = std::time::Instant::now();

        self.enter(CrawlPhase::DiscoveringSitemaps)?;
        let mut page = browser.new_page().await?;

        let base_url = self.config.site.base_url.clone();
        let index_url = sitemap_index_url(&base_url, &self.config.site.sitemap_index_path)?;
        tracing::info!("Reading sitemap index {}", index_url);

        let sitemaps = self
            .discovery
            .list_sitemaps(page.as_mut(), &index_url, &self.config.site.sitemap_marker)
            .await
            .map_err(|source| HarvestError::Discovery {
                url: index_url.to_string(),
                source,
            })?;
        tracing::info!("Found {} sitemaps", sitemaps.len());

        for (index, sitemap_url) in sitemaps.iter().enumerate() {
            self.enter(CrawlPhase::DiscoveringPosts)?;

            let post_urls = self
                .discovery
                .list_post_urls(page.as_mut(), sitemap_url, &base_url)
                .await
                .map_err(|source| HarvestError::Discovery {
                    url: sitemap_url.clone(),
                    source,
                })?;
            self.report.sitemaps_visited += 1;
            tracing::debug!("Sitemap {} lists {} posts", sitemap_url, post_urls.len());

            let identifiers: Vec<String> = post_urls
                .iter()
                .filter_map(|url| post_identifier(url, &base_url))
                .collect();

            for id in identifiers {
                self.report.posts_discovered += 1;
                self.process_post(page.as_mut(), &id).await?;
            }

            tracing::info!(
                "Progress: sitemap {}/{} done, {} scraped, {} failed, {} skipped, {} posts stored",
                index + 1,
                sitemaps.len(),
                self.report.scraped,
                self.report.failed,
                self.report.skipped_total(),
                self.store.len()
            );
        }

        self.enter(CrawlPhase::Done)?;
        tracing::info!(
            "Crawl completed in {:?}: {}",
            start_time.elapsed(),
            self.report
        );

        Ok(self.report.clone())
    }

    /// Handles one discovered post from skip check through cooldown
    async fn process_post(&mut self, page: &mut dyn Page, id: &str) -> Result<PostOutcome> {
        self.enter(CrawlPhase::CheckSkip)?;
        if let Some(reason) = self.policy.check(id, &self.store, &self.ledger) {
            tracing::debug!("Skipping '{}': {}", id, reason);
            let outcome = PostOutcome::Skipped(reason);
            self.report.record(&outcome);
            return Ok(outcome);
        }

        self.enter(CrawlPhase::Extracting)?;
        let url = post_url(&self.config.site.base_url, id);
        tracing::debug!("Extracting {}", url);
        let extracted = self.extractor.extract(page, &url).await;

        self.enter(CrawlPhase::Persisting)?;
        let outcome = match extracted {
            Ok(extraction) => {
                for field in &extraction.missing {
                    tracing::warn!("{}: field '{}' not found", id, field);
                }
                self.store.set(id.to_string(), extraction.record)?;
                tracing::info!("Scraped: {}", id);
                PostOutcome::Scraped
            }
            Err(e) => {
                tracing::error!("Error scraping {}: {}", id, e);
                self.ledger.record(id)?;
                PostOutcome::Failed(e.to_string())
            }
        };
        self.report.record(&outcome);

        self.enter(CrawlPhase::Cooldown)?;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        Ok(outcome)
    }

    fn enter(&mut self, next: CrawlPhase) -> Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("Phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }
}

/// Runs a complete crawl with the configured rendering engine
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Check the store's schema version and load prior progress
/// 2. Launch the configured rendering engine
/// 3. Walk the sitemap index and every matching sitemap
/// 4. Extract and persist each post not seen before
/// 5. Close the engine and return the run counters
///
/// # Example
///
/// ```no_run
/// use sitemap_harvest::config::load_config;
/// use sitemap_harvest::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let report = run_crawl(config).await?;
/// println!("{}", report);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
