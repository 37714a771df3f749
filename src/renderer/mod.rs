//! Rendering engine abstraction
//!
//! The crawler only needs a handful of capabilities from whatever loads pages:
//! open a page, navigate it, query elements by CSS selector, and (for engines
//! that run scripts) evaluate an expression. Two backends are provided:
//!
//! - `static`: plain HTTP fetch with `reqwest`, DOM queries with `scraper`
//! - `chromium`: a headless Chromium via `chromiumoxide` (feature `chromium`)
//!
//! Backends are selected by `[crawler] engine` and created with [`launch`].

#[cfg(feature = "chromium")]
mod chromium;
mod static_engine;

#[cfg(feature = "chromium")]
pub use chromium::ChromiumBrowser;
pub use static_engine::{build_http_client, select_elements, StaticBrowser, StaticPage};

use crate::config::{CrawlerConfig, EngineKind, UserAgentConfig, WaitUntil};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a rendering engine
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to launch rendering engine: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Navigation to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("Invalid selector {selector}: {message}")]
    Selector { selector: String, message: String },

    #[error("Script evaluation failed: {0}")]
    Evaluate(String),

    #[error("{0} is not supported by this engine")]
    Unsupported(&'static str),

    #[error("No document loaded; call goto first")]
    NoDocument,

    #[error("Browser is closed")]
    Closed,
}

/// Result type for rendering engine operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Detached snapshot of one matched element
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Element {
    /// Rendered text; `<br>` becomes a line break, other whitespace collapses
    pub text: String,

    /// Attribute name -> value
    pub attributes: BTreeMap<String, String>,
}

impl Element {
    /// Gets an attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Rendered text with surrounding whitespace removed
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }
}

/// A launched rendering engine instance
///
/// Acquired once per run and closed on every exit path.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Opens a new blank page
    async fn new_page(&self) -> RenderResult<Box<dyn Page>>;

    /// Releases the engine; calling it twice is harmless
    async fn close(&mut self) -> RenderResult<()>;
}

/// A single page (tab) of a rendering engine
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigates to `url` and waits for `wait` or `timeout`, whichever is first
    async fn goto(&mut self, url: &str, wait: WaitUntil, timeout: Duration) -> RenderResult<()>;

    /// Returns every element matching the CSS `selector`, in document order
    async fn query_all(&self, selector: &str) -> RenderResult<Vec<Element>>;

    /// Evaluates a script expression in the page and returns its JSON value
    async fn evaluate(&self, expression: &str) -> RenderResult<serde_json::Value>;
}

/// Launches the rendering engine selected by `config.engine`
pub async fn launch(
    config: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> RenderResult<Box<dyn Browser>> {
    match config.engine {
        EngineKind::Static => {
            tracing::debug!("Launching static rendering engine");
            Ok(Box::new(StaticBrowser::new(user_agent, config)?))
        }
        EngineKind::Chromium => launch_chromium(config, user_agent).await,
    }
}

#[cfg(feature = "chromium")]
async fn launch_chromium(
    config: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> RenderResult<Box<dyn Browser>> {
    tracing::debug!("Launching chromium rendering engine");
    Ok(Box::new(ChromiumBrowser::launch(config, user_agent).await?))
}

#[cfg(not(feature = "chromium"))]
async fn launch_chromium(
    _config: &CrawlerConfig,
    _user_agent: &UserAgentConfig,
) -> RenderResult<Box<dyn Browser>> {
    Err(RenderError::Launch(
        "engine = \"chromium\" requires building with --features chromium".to_string(),
    ))
}
