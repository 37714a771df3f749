//! Headless Chromium rendering engine
//!
//! Pages are loaded in a real browser so script-rendered content is present
//! before extraction. Element queries run as page scripts and return detached
//! snapshots, the same shape the static engine produces.

use crate::config::{CrawlerConfig, UserAgentConfig, WaitUntil};
use crate::renderer::{Browser, Element, Page, RenderError, RenderResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Quiet period after `readyState === "complete"` that counts as network idle
const NETWORK_IDLE_GRACE: Duration = Duration::from_millis(500);

/// Interval between readiness polls
const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Chromium browser plus the task draining its CDP event stream
pub struct ChromiumBrowser {
    browser: CdpBrowser,
    handler: Option<JoinHandle<()>>,
}

impl ChromiumBrowser {
    /// Launches Chromium with the crawler's user agent
    pub async fn launch(config: &CrawlerConfig, user_agent: &UserAgentConfig) -> RenderResult<Self> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(Duration::from_millis(config.navigation_timeout_ms))
            .arg(format!("--user-agent={}", user_agent.header_value()))
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--mute-audio");
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(RenderError::Launch)?;

        let (browser, mut handler) = CdpBrowser::launch(browser_config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler error: {:?}", e);
                }
            }
        });

        tracing::info!("Chromium launched");
        Ok(Self {
            browser,
            handler: Some(handler),
        })
    }
}

#[async_trait]
impl Browser for ChromiumBrowser {
    async fn new_page(&self) -> RenderResult<Box<dyn Page>> {
        if self.handler.is_none() {
            return Err(RenderError::Closed);
        }
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;
        Ok(Box::new(ChromiumPage { page }))
    }

    async fn close(&mut self) -> RenderResult<()> {
        let Some(handler) = self.handler.take() else {
            return Ok(());
        };

        tracing::info!("Closing chromium");
        let result = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            tracing::warn!("Chromium did not exit cleanly: {}", e);
        }
        handler.abort();

        result
            .map(|_| ())
            .map_err(|e| RenderError::Launch(format!("close failed: {}", e)))
    }
}

impl Drop for ChromiumBrowser {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            tracing::warn!("ChromiumBrowser dropped without close()");
            handler.abort();
        }
    }
}

/// One Chromium tab
pub struct ChromiumPage {
    page: CdpPage,
}

impl ChromiumPage {
    async fn navigate(&self, url: &str, wait: WaitUntil, deadline: Instant) -> RenderResult<()> {
        let nav_error = |e: chromiumoxide::error::CdpError| RenderError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        };

        self.page.goto(url).await.map_err(nav_error)?;
        self.page.wait_for_navigation().await.map_err(nav_error)?;

        if wait == WaitUntil::NetworkIdle {
            while Instant::now() < deadline {
                let state = self.evaluate("document.readyState").await?;
                if state.as_str() == Some("complete") {
                    tokio::time::sleep(NETWORK_IDLE_GRACE).await;
                    break;
                }
                tokio::time::sleep(READY_POLL_INTERVAL).await;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Page for ChromiumPage {
    async fn goto(&mut self, url: &str, wait: WaitUntil, timeout: Duration) -> RenderResult<()> {
        let deadline = Instant::now() + timeout;
        tokio::time::timeout(timeout, self.navigate(url, wait, deadline))
            .await
            .map_err(|_| RenderError::Timeout {
                url: url.to_string(),
                timeout,
            })?
    }

    async fn query_all(&self, selector: &str) -> RenderResult<Vec<Element>> {
        let selector_literal =
            serde_json::to_string(selector).map_err(|e| RenderError::Selector {
                selector: selector.to_string(),
                message: e.to_string(),
            })?;
        let script = format!(
            r#"Array.from(document.querySelectorAll({})).map(el => ({{
                text: el.innerText || el.textContent || "",
                attributes: Object.fromEntries(Array.from(el.attributes).map(a => [a.name, a.value]))
            }}))"#,
            selector_literal
        );

        let value = self.evaluate(&script).await?;
        serde_json::from_value(value).map_err(|e| RenderError::Evaluate(e.to_string()))
    }

    async fn evaluate(&self, expression: &str) -> RenderResult<serde_json::Value> {
        self.page
            .evaluate(expression)
            .await
            .map_err(|e| RenderError::Evaluate(e.to_string()))?
            .into_value::<serde_json::Value>()
            .map_err(|e| RenderError::Evaluate(e.to_string()))
    }
}
