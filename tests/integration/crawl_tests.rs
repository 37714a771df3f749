//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small site and run the full crawl
//! cycle end-to-end through the static rendering engine.

use crate::common::{create_test_config, post_page, sitemap_index, url_set};
use sitemap_harvest::crawler::run_crawl;
use sitemap_harvest::model::InfoValue;
use sitemap_harvest::storage::{IgnoreLedger, KeyValueStore, PostStore};
use sitemap_harvest::HarvestError;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, route: &str, body: String, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(expected_hits)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_then_rerun() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/sitemap_index.xml",
        sitemap_index(&[
            format!("{}/post-sitemap.xml", base_url),
            format!("{}/page-sitemap.xml", base_url),
        ]),
        2,
    )
    .await;
    mount_page(
        &mock_server,
        "/post-sitemap.xml",
        url_set(&[
            format!("{}/", base_url),
            format!("{}/game-a/", base_url),
            format!("{}/game-b/", base_url),
            format!("{}/updates-digest-may/", base_url),
        ]),
        2,
    )
    .await;
    mount_page(&mock_server, "/page-sitemap.xml", String::new(), 0).await;
    mount_page(&mock_server, "/updates-digest-may/", String::new(), 0).await;

    // Only fetched once across both runs, with our User-Agent
    Mock::given(method("GET"))
        .and(path("/game-a/"))
        .and(header("user-agent", "TestBot/1.0.0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(post_page("game-a", "Action, Adventure", "12/05/2021"))
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/game-b/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, &dir);

    let first = run_crawl(config.clone()).await.expect("first crawl failed");
    assert_eq!(first.sitemaps_visited, 1);
    assert_eq!(first.posts_discovered, 4);
    assert_eq!((first.scraped, first.failed), (1, 1));
    assert_eq!(first.skipped["excluded"], 1);
    assert_eq!(first.skipped["empty"], 1);

    let store = PostStore::load(Path::new(&config.output.store_path));
    let post = store.get("game-a/").expect("game-a was not stored");
    assert_eq!(post.title.as_deref(), Some("game-a"));
    assert_eq!(
        post.image.as_deref(),
        Some("https://covers.example.com/game-a.jpg")
    );
    assert_eq!(
        post.genres(),
        Some(&["Action".to_string(), "Adventure".to_string()][..])
    );
    assert_eq!(
        post.info.get("Repack Size"),
        Some(&InfoValue::Scalar("1 GB".to_string()))
    );
    assert_eq!(post.preview_images, vec!["https://riotpixels.net/game-a-1.jpg"]);
    assert!(post.created_at.is_some());

    let ledger = IgnoreLedger::load(Path::new(&config.output.ignore_path));
    assert_eq!(ledger.entries(), ["game-b/".to_string()]);

    let second = run_crawl(config.clone()).await.expect("second crawl failed");
    assert_eq!(second.fetched(), 0);
    assert_eq!(second.skipped["already_stored"], 1);
    assert_eq!(second.skipped["ignored"], 1);

    // Hit counts are verified when the server drops
}

#[tokio::test]
async fn test_store_file_layout() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/sitemap_index.xml",
        sitemap_index(&[format!("{}/post-sitemap.xml", base_url)]),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/post-sitemap.xml",
        url_set(&[format!("{}/game-a/", base_url)]),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/game-a/",
        post_page("game-a", "Action", "12/05/2021"),
        1,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base_url, &dir);
    run_crawl(config.clone()).await.unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&config.output.store_path).unwrap())
            .unwrap();
    let record = &raw["game-a/"];
    assert_eq!(record["title"], "game-a");
    assert!(record["createdAt"].is_i64());
    assert!(record["previewImages"].is_array());
    assert_eq!(record["info"]["genres"], serde_json::json!(["Action"]));
    assert!(Path::new(&config.output.schema_path).exists());
}

#[tokio::test]
async fn test_unreachable_index_fails_the_run() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap_index.xml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), &dir);

    let err = run_crawl(config.clone()).await.unwrap_err();
    assert!(matches!(err, HarvestError::Discovery { .. }));
    assert!(!Path::new(&config.output.store_path).exists());
}
