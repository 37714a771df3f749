//! Re-run, failure and interruption behavior of the crawl driver

use crate::common::{create_test_config, post_page, sitemap_index, url_set, ScriptedSite, SITE};
use sitemap_harvest::crawler::Coordinator;
use sitemap_harvest::storage::{IgnoreLedger, KeyValueStore, PostStore};
use sitemap_harvest::{CrawlPhase, HarvestError};
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn url(path: &str) -> String {
    format!("{}/{}", SITE, path)
}

/// A site with one post sitemap listing `posts`, each served as a post page
fn site_with_posts(posts: &[&str]) -> ScriptedSite {
    let site = ScriptedSite::new();
    site.page(
        &url("sitemap_index.xml"),
        &sitemap_index(&[url("post-sitemap.xml"), url("page-sitemap.xml")]),
    );
    let urls: Vec<String> = posts.iter().map(|p| url(p)).collect();
    site.page(&url("post-sitemap.xml"), &url_set(&urls));
    for post in posts {
        site.page(&url(post), &post_page(post.trim_end_matches('/'), "Action, Indie", "01/02/2020"));
    }
    site
}

fn load_store(config: &sitemap_harvest::Config) -> PostStore {
    PostStore::load(Path::new(&config.output.store_path))
}

fn load_ledger(config: &sitemap_harvest::Config) -> IgnoreLedger {
    IgnoreLedger::load(Path::new(&config.output.ignore_path))
}

#[tokio::test]
async fn test_rerun_fetches_nothing_new() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(SITE, &dir);
    let site = site_with_posts(&["game-a/", "game-b/", "game-c/"]);

    let mut coordinator = Coordinator::new(config.clone()).unwrap();
    let first = coordinator.run_with_browser(&site.browser()).await.unwrap();
    assert_eq!(first.scraped, 3);
    assert_eq!(first.sitemaps_visited, 1);
    assert_eq!(coordinator.phase(), CrawlPhase::Done);

    site.clear_visits();
    let mut coordinator = Coordinator::new(config.clone()).unwrap();
    let second = coordinator.run_with_browser(&site.browser()).await.unwrap();

    assert_eq!(second.fetched(), 0);
    assert_eq!(second.skipped["already_stored"], 3);
    // Only the index and the sitemap are read again
    assert_eq!(
        site.visits(),
        vec![url("sitemap_index.xml"), url("post-sitemap.xml")]
    );
    assert_eq!(load_store(&config).len(), 3);
}

#[tokio::test]
async fn test_failed_post_is_ignored_on_later_runs() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(SITE, &dir);
    let site = site_with_posts(&["game-a/", "broken/", "game-c/"]);
    site.fail(&url("broken/"));

    let mut coordinator = Coordinator::new(config.clone()).unwrap();
    let first = coordinator.run_with_browser(&site.browser()).await.unwrap();
    assert_eq!((first.scraped, first.failed), (2, 1));

    let store = load_store(&config);
    let ledger = load_ledger(&config);
    assert!(!store.has("broken/"));
    assert_eq!(ledger.entries(), ["broken/".to_string()]);

    // The page recovers, but the ledger keeps it from being fetched
    site.page(&url("broken/"), &post_page("broken", "RPG", "01/02/2020"));
    site.clear_visits();
    let mut coordinator = Coordinator::new(config.clone()).unwrap();
    let second = coordinator.run_with_browser(&site.browser()).await.unwrap();

    assert_eq!(site.visit_count(&url("broken/")), 0);
    assert_eq!(second.skipped["ignored"], 1);
    assert!(!load_store(&config).has("broken/"));
}

#[tokio::test]
async fn test_page_without_title_is_a_failure() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(SITE, &dir);
    let site = site_with_posts(&["game-a/"]);
    site.page(&url("game-a/"), "<html><body><p>Not a post</p></body></html>");

    let mut coordinator = Coordinator::new(config.clone()).unwrap();
    let report = coordinator.run_with_browser(&site.browser()).await.unwrap();

    assert_eq!(report.failed, 1);
    assert!(load_ledger(&config).contains("game-a/"));
    assert!(load_store(&config).is_empty());
}

#[tokio::test]
async fn test_excluded_and_root_urls_are_never_fetched() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(SITE, &dir);
    let site = site_with_posts(&["game-a/", "updates-digest-2021-05/"]);
    site.page(
        &url("post-sitemap.xml"),
        &url_set(&[
            format!("{}/", SITE),
            url("game-a/"),
            url("updates-digest-2021-05/"),
            "https://elsewhere.test/game-z/".to_string(),
        ]),
    );

    let mut coordinator = Coordinator::new(config.clone()).unwrap();
    let report = coordinator.run_with_browser(&site.browser()).await.unwrap();

    assert_eq!(report.posts_discovered, 3);
    assert_eq!(report.scraped, 1);
    assert_eq!(report.skipped["excluded"], 1);
    assert_eq!(report.skipped["empty"], 1);
    assert_eq!(site.visit_count(&url("updates-digest-2021-05/")), 0);
    assert_eq!(site.visit_count(&format!("{}/", SITE)), 0);
    assert!(site.visits().iter().all(|v| !v.contains("elsewhere.test")));
    // Exclusions are not failures
    assert!(load_ledger(&config).is_empty());
}

#[tokio::test]
async fn test_interrupted_run_keeps_completed_posts() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(SITE, &dir);
    let site = site_with_posts(&["game-a/", "game-b/", "game-c/"]);
    site.hang(&url("game-b/"));

    let mut coordinator = Coordinator::new(config.clone()).unwrap();
    let browser = site.browser();
    let interrupted = tokio::time::timeout(
        Duration::from_millis(300),
        coordinator.run_with_browser(&browser),
    )
    .await;
    assert!(interrupted.is_err(), "run should still be waiting on game-b");
    drop(coordinator);

    let store = load_store(&config);
    assert!(store.has("game-a/"));
    assert!(!store.has("game-b/"));
    assert!(load_ledger(&config).is_empty());

    // Resume once the page loads again
    site.page(&url("game-b/"), &post_page("game-b", "RPG", "03/02/2020"));
    site.clear_visits();
    let mut coordinator = Coordinator::new(config.clone()).unwrap();
    let resumed = coordinator.run_with_browser(&site.browser()).await.unwrap();

    assert_eq!(site.visit_count(&url("game-a/")), 0);
    assert_eq!(resumed.scraped, 2);
    assert_eq!(load_store(&config).len(), 3);
}

#[tokio::test]
async fn test_cooldown_between_fetches_only() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(SITE, &dir);
    config.crawler.delay_ms = 40;
    let site = site_with_posts(&["game-a/", "game-b/", "updates-digest-1/"]);

    let mut coordinator = Coordinator::new(config.clone()).unwrap();
    let started = Instant::now();
    let report = coordinator.run_with_browser(&site.browser()).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(report.fetched(), 2);
    assert!(
        elapsed >= Duration::from_millis(80),
        "two fetches should wait twice, took {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_missing_index_aborts_run() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(SITE, &dir);
    let site = ScriptedSite::new();

    let mut coordinator = Coordinator::new(config.clone()).unwrap();
    let err = coordinator
        .run_with_browser(&site.browser())
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::Discovery { ref url, .. } if url.ends_with("/sitemap_index.xml")));
    assert!(load_store(&config).is_empty());
}

#[tokio::test]
async fn test_missing_sitemap_aborts_run_after_earlier_progress() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(SITE, &dir);
    let site = site_with_posts(&["game-a/"]);
    site.page(
        &url("sitemap_index.xml"),
        &sitemap_index(&[url("post-sitemap.xml"), url("post-sitemap2.xml")]),
    );

    let mut coordinator = Coordinator::new(config.clone()).unwrap();
    let err = coordinator
        .run_with_browser(&site.browser())
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::Discovery { ref url, .. } if url.ends_with("post-sitemap2.xml")));
    assert!(load_store(&config).has("game-a/"));
}

#[tokio::test]
async fn test_engine_is_closed_after_a_failed_run() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(SITE, &dir);
    let site = ScriptedSite::new();

    let mut coordinator = Coordinator::new(config).unwrap();
    let err = coordinator
        .run_with_engine(Box::new(site.browser()))
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::Discovery { .. }));
    assert_eq!(site.engine_closes(), 1);
}

#[tokio::test]
async fn test_engine_is_closed_after_a_completed_run() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(SITE, &dir);
    let site = site_with_posts(&["game-a/"]);

    let mut coordinator = Coordinator::new(config).unwrap();
    let report = coordinator
        .run_with_engine(Box::new(site.browser()))
        .await
        .unwrap();

    assert_eq!(report.scraped, 1);
    assert_eq!(site.engine_closes(), 1);
}
