//! Static rendering engine
//!
//! Loads pages with a plain HTTP GET and answers selector queries from the
//! parsed HTML. No scripts run, so this suits server-rendered pages and XML
//! sitemaps (whose `<loc>` elements are queryable like any other tag).

use crate::config::{CrawlerConfig, UserAgentConfig, WaitUntil};
use crate::renderer::{Browser, Element, Page, RenderError, RenderResult};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Node, Selector};
use std::time::Duration;

/// Builds the HTTP client used for page loads
///
/// # Example
///
/// ```no_run
/// use sitemap_harvest::config::UserAgentConfig;
/// use sitemap_harvest::renderer::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// HTTP-backed browser
pub struct StaticBrowser {
    client: Client,
    closed: bool,
}

impl StaticBrowser {
    /// Creates the browser and its HTTP client
    pub fn new(user_agent: &UserAgentConfig, config: &CrawlerConfig) -> RenderResult<Self> {
        let timeout = Duration::from_millis(config.navigation_timeout_ms);
        let client = build_http_client(user_agent, timeout)
            .map_err(|e| RenderError::Launch(e.to_string()))?;
        Ok(Self {
            client,
            closed: false,
        })
    }
}

#[async_trait]
impl Browser for StaticBrowser {
    async fn new_page(&self) -> RenderResult<Box<dyn Page>> {
        if self.closed {
            return Err(RenderError::Closed);
        }
        Ok(Box::new(StaticPage::new(self.client.clone())))
    }

    async fn close(&mut self) -> RenderResult<()> {
        if !self.closed {
            tracing::debug!("Closing static rendering engine");
            self.closed = true;
        }
        Ok(())
    }
}

/// One page of the static engine: the last fetched document
pub struct StaticPage {
    client: Client,
    // Kept as text: the parsed tree is not Send, so it is rebuilt per query
    document: Option<String>,
}

impl StaticPage {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            document: None,
        }
    }

    /// Loads a document directly, without a network fetch
    pub fn set_content(&mut self, html: impl Into<String>) {
        self.document = Some(html.into());
    }

    async fn fetch(&self, url: &str) -> RenderResult<String> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                RenderError::Navigation {
                    url: url.to_string(),
                    message: "request timeout".to_string(),
                }
            } else if e.is_connect() {
                RenderError::Navigation {
                    url: url.to_string(),
                    message: "connection refused".to_string(),
                }
            } else {
                RenderError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| RenderError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl Page for StaticPage {
    async fn goto(&mut self, url: &str, wait: WaitUntil, timeout: Duration) -> RenderResult<()> {
        // The whole body is read before returning, which satisfies either wait condition
        tracing::trace!("GET {} (wait: {:?})", url, wait);
        self.document = None;

        let body = tokio::time::timeout(timeout, self.fetch(url))
            .await
            .map_err(|_| RenderError::Timeout {
                url: url.to_string(),
                timeout,
            })??;

        self.document = Some(body);
        Ok(())
    }

    async fn query_all(&self, selector: &str) -> RenderResult<Vec<Element>> {
        let html = self.document.as_deref().ok_or(RenderError::NoDocument)?;
        select_elements(html, selector)
    }

    async fn evaluate(&self, _expression: &str) -> RenderResult<serde_json::Value> {
        Err(RenderError::Unsupported("script evaluation"))
    }
}

/// Runs a CSS selector over an HTML document and snapshots the matches
pub fn select_elements(html: &str, selector: &str) -> RenderResult<Vec<Element>> {
    let parsed = Selector::parse(selector).map_err(|e| RenderError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })?;

    let document = Html::parse_document(html);
    Ok(document
        .select(&parsed)
        .map(|element| Element {
            text: rendered_text(element),
            attributes: element
                .value()
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        })
        .collect())
}

/// Approximates `innerText` for an element
///
/// Whitespace runs collapse to one space, `<br>` produces a line break, and
/// script/style contents are dropped. Each line is trimmed.
fn rendered_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();

    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => {
                let hidden = node
                    .parent()
                    .and_then(|parent| parent.value().as_element())
                    .map(|parent| matches!(parent.name(), "script" | "style"))
                    .unwrap_or(false);
                if hidden {
                    continue;
                }
                let mut last_was_space = raw.ends_with(' ');
                for c in text.chars() {
                    if c.is_whitespace() {
                        if !last_was_space {
                            raw.push(' ');
                            last_was_space = true;
                        }
                    } else {
                        raw.push(c);
                        last_was_space = false;
                    }
                }
            }
            Node::Element(el) if el.name() == "br" => raw.push('\n'),
            _ => {}
        }
    }

    raw.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
