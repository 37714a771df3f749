//! Shared fixtures: test configuration, page builders and a scripted engine

use async_trait::async_trait;
use sitemap_harvest::config::{Config, WaitUntil};
use sitemap_harvest::renderer::{select_elements, Browser, Element, Page, RenderError, RenderResult};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

pub const SITE: &str = "https://site.test";

/// Creates a config for `base_url` whose output files live in `dir`
pub fn create_test_config(base_url: &str, dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.crawler.delay_ms = 0;
    config.crawler.navigation_timeout_ms = 5_000;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.user_agent.crawler_version = "1.0.0".to_string();
    config.output.store_path = path_in(dir, "scraped_data.json");
    config.output.ignore_path = path_in(dir, "ignored.json");
    config.output.schema_path = path_in(dir, "scraped_data.schema.json");
    config
}

fn path_in(dir: &TempDir, name: &str) -> String {
    let path: PathBuf = dir.path().join(name);
    path.display().to_string()
}

/// A sitemap index listing the given sitemap URLs
pub fn sitemap_index(sitemaps: &[String]) -> String {
    let entries: String = sitemaps
        .iter()
        .map(|loc| format!("<sitemap><loc>{}</loc></sitemap>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</sitemapindex>"#,
        entries
    )
}

/// A sitemap listing the given page URLs
pub fn url_set(urls: &[String]) -> String {
    let entries: String = urls
        .iter()
        .map(|loc| format!("<url><loc>{}</loc></url>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        entries
    )
}

/// A post page in the layout the extractor reads
pub fn post_page(title: &str, genres: &str, date: &str) -> String {
    format!(
        r#"<html><body><article>
            <h1 class="entry-title">{title}</h1>
            <time class="entry-date">{date}</time>
            <div class="entry-content">
                <p><img src="https://covers.example.com/{title}.jpg"></p>
                <p>Genres/Tags: {genres}<br>Repack Size: 1 GB</p>
                <p><img src="https://riotpixels.net/{title}-1.jpg"></p>
            </div>
        </article></body></html>"#
    )
}

#[derive(Default)]
struct SiteState {
    documents: HashMap<String, String>,
    failing: HashSet<String>,
    hanging: HashSet<String>,
    visits: Vec<String>,
    engine_closes: usize,
}

/// In-memory site served by [`ScriptedBrowser`]
///
/// Clones share state, so a test keeps one handle to inspect visits while the
/// coordinator drives another.
#[derive(Clone, Default)]
pub struct ScriptedSite {
    state: Arc<Mutex<SiteState>>,
}

impl ScriptedSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `html` at `url`
    pub fn page(&self, url: &str, html: &str) -> &Self {
        let mut state = self.state.lock().unwrap();
        state.documents.insert(url.to_string(), html.to_string());
        state.hanging.remove(url);
        state.failing.remove(url);
        self
    }

    /// Makes navigation to `url` fail
    pub fn fail(&self, url: &str) -> &Self {
        self.state.lock().unwrap().failing.insert(url.to_string());
        self
    }

    /// Makes navigation to `url` never complete
    pub fn hang(&self, url: &str) -> &Self {
        self.state.lock().unwrap().hanging.insert(url.to_string());
        self
    }

    /// Every URL navigated to so far, in order
    pub fn visits(&self) -> Vec<String> {
        self.state.lock().unwrap().visits.clone()
    }

    pub fn visit_count(&self, url: &str) -> usize {
        self.visits().iter().filter(|v| v.as_str() == url).count()
    }

    /// How many times an engine serving this site was closed
    pub fn engine_closes(&self) -> usize {
        self.state.lock().unwrap().engine_closes
    }

    pub fn clear_visits(&self) {
        self.state.lock().unwrap().visits.clear();
    }

    pub fn browser(&self) -> ScriptedBrowser {
        ScriptedBrowser { site: self.clone() }
    }
}

/// Rendering engine test double backed by a [`ScriptedSite`]
pub struct ScriptedBrowser {
    site: ScriptedSite,
}

#[async_trait]
impl Browser for ScriptedBrowser {
    async fn new_page(&self) -> RenderResult<Box<dyn Page>> {
        Ok(Box::new(ScriptedPage {
            site: self.site.clone(),
            current: None,
        }))
    }

    async fn close(&mut self) -> RenderResult<()> {
        self.site.state.lock().unwrap().engine_closes += 1;
        Ok(())
    }
}

struct ScriptedPage {
    site: ScriptedSite,
    current: Option<String>,
}

enum Navigation {
    Loaded(String),
    Failed,
    Hang,
    NotFound,
}

#[async_trait]
impl Page for ScriptedPage {
    async fn goto(&mut self, url: &str, _wait: WaitUntil, _timeout: Duration) -> RenderResult<()> {
        self.current = None;

        let navigation = {
            let mut state = self.site.state.lock().unwrap();
            state.visits.push(url.to_string());
            if state.hanging.contains(url) {
                Navigation::Hang
            } else if state.failing.contains(url) {
                Navigation::Failed
            } else {
                match state.documents.get(url) {
                    Some(html) => Navigation::Loaded(html.clone()),
                    None => Navigation::NotFound,
                }
            }
        };

        match navigation {
            Navigation::Loaded(html) => {
                self.current = Some(html);
                Ok(())
            }
            Navigation::Failed => Err(RenderError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_RESET".to_string(),
            }),
            Navigation::Hang => std::future::pending().await,
            Navigation::NotFound => Err(RenderError::Http {
                url: url.to_string(),
                status: 404,
            }),
        }
    }

    async fn query_all(&self, selector: &str) -> RenderResult<Vec<Element>> {
        let html = self.current.as_deref().ok_or(RenderError::NoDocument)?;
        select_elements(html, selector)
    }

    async fn evaluate(&self, _expression: &str) -> RenderResult<serde_json::Value> {
        Err(RenderError::Unsupported("script evaluation"))
    }
}
