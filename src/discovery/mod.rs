//! Link discovery over the site's sitemaps
//!
//! The sitemap index lists second-level sitemaps; each of those lists post
//! URLs. Links are read from anchors (browser-rendered sitemaps) and from
//! `<loc>` elements (raw XML), in page order, without duplicates.

use crate::config::{CrawlerConfig, WaitUntil};
use crate::renderer::{Page, RenderError, RenderResult};
use crate::url::{is_under_base, resolve_link};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Reads sitemap pages through a rendering engine page
#[derive(Debug, Clone)]
pub struct LinkDiscovery {
    wait: WaitUntil,
    timeout: Duration,
}

impl LinkDiscovery {
    pub fn new(config: &CrawlerConfig) -> Self {
        Self {
            wait: config.wait_until,
            timeout: Duration::from_millis(config.navigation_timeout_ms),
        }
    }

    /// Lists the sitemap URLs in the index whose text contains `marker`
    ///
    /// Order is page order; it is not guaranteed stable across site changes.
    pub async fn list_sitemaps(
        &self,
        page: &mut dyn Page,
        index_url: &Url,
        marker: &str,
    ) -> RenderResult<Vec<String>> {
        page.goto(index_url.as_str(), self.wait, self.timeout).await?;
        let links = collect_links(page, index_url).await?;
        Ok(links.into_iter().filter(|l| l.contains(marker)).collect())
    }

    /// Lists the URLs in one sitemap that belong to the site at `base_url`
    pub async fn list_post_urls(
        &self,
        page: &mut dyn Page,
        sitemap_url: &str,
        base_url: &str,
    ) -> RenderResult<Vec<String>> {
        page.goto(sitemap_url, self.wait, self.timeout).await?;
        let page_url = Url::parse(sitemap_url).map_err(|e| RenderError::Navigation {
            url: sitemap_url.to_string(),
            message: e.to_string(),
        })?;
        let links = collect_links(page, &page_url).await?;
        Ok(links
            .into_iter()
            .filter(|l| is_under_base(l, base_url))
            .collect())
    }
}

/// Anchors and `<loc>` elements, matched together so page order holds
const LINK_SELECTOR: &str = "a[href], loc";

/// Collects absolute links from anchors and `<loc>` elements, first occurrence wins
async fn collect_links(page: &dyn Page, page_url: &Url) -> RenderResult<Vec<String>> {
    let elements = page.query_all(LINK_SELECTOR).await?;

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for element in &elements {
        let href = element
            .attr("href")
            .unwrap_or_else(|| element.trimmed_text());
        if let Some(link) = resolve_link(href, page_url) {
            if seen.insert(link.clone()) {
                links.push(link);
            }
        }
    }
    Ok(links)
}
