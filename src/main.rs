//! Sitemap-Harvest main entry point
//!
//! This is the command-line interface for the Sitemap-Harvest post crawler.

use anyhow::Context;
use clap::Parser;
use sitemap_harvest::config::{load_config_with_hash, Config};
use sitemap_harvest::crawler::run_crawl;
use sitemap_harvest::migrate::{run_migrations, CURRENT_SCHEMA_VERSION};
use sitemap_harvest::output::{load_statistics, print_statistics};
use sitemap_harvest::storage::{IgnoreLedger, KeyValueStore, PostStore, SchemaMarker};
use sitemap_harvest::url::sitemap_index_url;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Sitemap-Harvest: a resumable single-site post crawler
///
/// Walks a site's sitemap index, extracts a record for every post not seen
/// before, and writes the records to a local JSON store after each post, so an
/// interrupted crawl picks up where it stopped.
#[derive(Parser, Debug)]
#[command(name = "sitemap-harvest")]
#[command(version)]
#[command(about = "A resumable single-site post crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["stats", "migrate"])]
    dry_run: bool,

    /// Show statistics for the post store and exit
    #[arg(long, conflicts_with_all = ["dry_run", "migrate"])]
    stats: bool,

    /// Apply pending store schema migrations and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            Config::default()
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else if cli.migrate {
        handle_migrate(&config)
    } else {
        handle_crawl(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_harvest=info,warn"),
            1 => EnvFilter::new("sitemap_harvest=debug,info"),
            2 => EnvFilter::new("sitemap_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the resolved settings and stored progress
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Sitemap-Harvest Dry Run ===\n");

    let index_url = sitemap_index_url(&config.site.base_url, &config.site.sitemap_index_path)?;
    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Sitemap index: {}", index_url);
    println!("  Sitemap marker: {}", config.site.sitemap_marker);
    println!("  Exclusions: {:?}", config.site.exclude_patterns);

    println!("\nCrawler:");
    println!("  Engine: {:?}", config.crawler.engine);
    println!("  Wait until: {:?}", config.crawler.wait_until);
    println!("  Delay between posts: {}ms", config.crawler.delay_ms);
    println!(
        "  Navigation timeout: {}ms",
        config.crawler.navigation_timeout_ms
    );
    println!("  User agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Store: {}", config.output.store_path);
    println!("  Ignore ledger: {}", config.output.ignore_path);
    println!("  Schema marker: {}", config.output.schema_path);

    let store_path = Path::new(&config.output.store_path);
    let marker = SchemaMarker::load(Path::new(&config.output.schema_path));
    let ledger = IgnoreLedger::load(Path::new(&config.output.ignore_path));

    println!("\nProgress:");
    if !store_path.exists() {
        println!("  No store yet; the first crawl creates it");
    } else if marker.version < CURRENT_SCHEMA_VERSION {
        println!(
            "  Store schema is at version {}, expected {}; run with --migrate first",
            marker.version, CURRENT_SCHEMA_VERSION
        );
    } else {
        let store = PostStore::load(store_path);
        println!("  Posts already stored: {} (will be skipped)", store.len());
    }
    println!("  Identifiers ignored: {} (will be skipped)", ledger.len());

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics for the post store
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Store: {}\n", config.output.store_path);

    let stats = load_statistics(config).context("Failed to read store statistics")?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --migrate mode: brings the store up to the current schema
fn handle_migrate(config: &Config) -> anyhow::Result<()> {
    let report = run_migrations(config).context("Migration failed")?;

    if report.is_noop() {
        println!("Store is at schema version {}, nothing to do", report.to_version);
        return Ok(());
    }

    println!(
        "Migrated store from version {} to {}:",
        report.from_version, report.to_version
    );
    for step in &report.applied {
        println!("  {} {}: {} records changed", step.version, step.name, step.changed);
    }
    println!(
        "Posts: {} before, {} after",
        report.posts_before, report.posts_after
    );

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Starting crawl of {} with the {:?} engine",
        config.site.base_url,
        config.crawler.engine
    );

    match run_crawl(config).await {
        Ok(report) => {
            tracing::info!("Crawl completed successfully: {}", report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
