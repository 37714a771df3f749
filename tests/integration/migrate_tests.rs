//! Legacy store upgrade flow

use crate::common::{create_test_config, post_page, sitemap_index, url_set, ScriptedSite, SITE};
use sitemap_harvest::crawler::Coordinator;
use sitemap_harvest::migrate::{run_migrations, CURRENT_SCHEMA_VERSION};
use sitemap_harvest::output::load_statistics;
use sitemap_harvest::storage::{KeyValueStore, PostStore, StorageError};
use sitemap_harvest::HarvestError;
use std::path::Path;
use tempfile::TempDir;

const LEGACY_STORE: &str = r#"{
  "old-game/": {
    "title": "Old Game",
    "image": "https://covers.example.com/old.jpg",
    "description": "Long text",
    "info": { "Genres/Tags": "Action, Racing" },
    "previewImages": ["https://riotpixels.net/old-1.jpg", "https://ads.example.com/banner.jpg"],
    "createdAt": "03/01/2019"
  },
  "updates-digest-jan/": {
    "title": "Updates Digest for January",
    "info": {},
    "previewImages": [],
    "createdAt": "31/01/2019"
  }
}"#;

#[tokio::test]
async fn test_legacy_store_must_be_migrated_before_crawling() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(SITE, &dir);
    config.extract.trusted_preview_host = Some("riotpixels".to_string());
    std::fs::write(&config.output.store_path, LEGACY_STORE).unwrap();

    let refused = Coordinator::new(config.clone());
    assert!(matches!(
        refused,
        Err(HarvestError::Storage(StorageError::SchemaOutdated { found: 0, .. }))
    ));
    // Refusing leaves the legacy file as it was
    assert_eq!(
        std::fs::read_to_string(&config.output.store_path).unwrap(),
        LEGACY_STORE
    );

    let report = run_migrations(&config).unwrap();
    assert_eq!(report.to_version, CURRENT_SCHEMA_VERSION);
    assert_eq!(report.posts_after, 1);

    let stats = load_statistics(&config).unwrap();
    assert_eq!(stats.schema_version, CURRENT_SCHEMA_VERSION);
    assert_eq!(stats.unreadable_posts, 0);

    // The migrated store is crawled into and keeps its old record
    let site = ScriptedSite::new();
    site.page(
        &format!("{}/sitemap_index.xml", SITE),
        &sitemap_index(&[format!("{}/post-sitemap.xml", SITE)]),
    )
    .page(
        &format!("{}/post-sitemap.xml", SITE),
        &url_set(&[
            format!("{}/old-game/", SITE),
            format!("{}/new-game/", SITE),
        ]),
    )
    .page(
        &format!("{}/new-game/", SITE),
        &post_page("new-game", "Puzzle", "05/06/2022"),
    );

    let mut coordinator = Coordinator::new(config.clone()).unwrap();
    let crawl = coordinator.run_with_browser(&site.browser()).await.unwrap();
    assert_eq!(crawl.scraped, 1);
    assert_eq!(crawl.skipped["already_stored"], 1);

    let store = PostStore::load(Path::new(&config.output.store_path));
    assert_eq!(store.len(), 2);
    let old = store.get("old-game/").unwrap();
    assert_eq!(
        old.preview_images,
        vec!["https://riotpixels.net/old-1.jpg"]
    );
    assert!(old.created_at.is_some());
}
