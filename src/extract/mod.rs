//! Post extractor
//!
//! Reads a fixed set of DOM locations from a rendered post page and builds a
//! [`PostRecord`]. Only the title is required; any other field that is not
//! found is left empty and reported in [`Extraction::missing`].
//!
//! | Field           | Location                                        |
//! |-----------------|-------------------------------------------------|
//! | `title`         | `.entry-title`                                  |
//! | `image`         | first `.entry-content img`                      |
//! | `previewImages` | remaining `.entry-content img` (trusted host)   |
//! | `info`          | `.entry-content p`, one `Key: value` per line   |
//! | `createdAt`     | `.entry-date` text, else its `datetime`         |

mod date;
mod info;

pub use date::parse_date;
pub use info::{merge_info_block, parse_info_block, split_genres};

use crate::config::{CrawlerConfig, ExtractConfig, WaitUntil};
use crate::model::PostRecord;
use crate::renderer::{Element, Page, RenderError};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

const TITLE_SELECTOR: &str = ".entry-title";
const IMAGE_SELECTOR: &str = ".entry-content img";
const INFO_SELECTOR: &str = ".entry-content p";
const DATE_SELECTOR: &str = ".entry-date";

/// Errors that make a page unusable as a post
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Required field '{0}' not found on page")]
    MissingRequired(&'static str),
}

/// Result of extracting one post
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub record: PostRecord,

    /// Optional fields that were not found on the page
    pub missing: Vec<&'static str>,
}

/// Loads post pages and extracts their records
#[derive(Debug, Clone)]
pub struct Extractor {
    wait: WaitUntil,
    timeout: Duration,
    trusted_preview_host: Option<String>,
}

impl Extractor {
    pub fn new(crawler: &CrawlerConfig, extract: &ExtractConfig) -> Self {
        Self {
            wait: crawler.wait_until,
            timeout: Duration::from_millis(crawler.navigation_timeout_ms),
            trusted_preview_host: extract.trusted_preview_host.clone(),
        }
    }

    /// Navigates `page` to `url` and extracts the post there
    pub async fn extract(&self, page: &mut dyn Page, url: &str) -> Result<Extraction, ExtractError> {
        page.goto(url, self.wait, self.timeout).await?;
        read_post(page, self.trusted_preview_host.as_deref()).await
    }
}

/// Extracts a post from the document already loaded in `page`
pub async fn read_post(
    page: &dyn Page,
    trusted_preview_host: Option<&str>,
) -> Result<Extraction, ExtractError> {
    let mut missing = Vec::new();

    let title = first_text(&page.query_all(TITLE_SELECTOR).await?)
        .ok_or(ExtractError::MissingRequired("title"))?;

    let images: Vec<String> = page
        .query_all(IMAGE_SELECTOR)
        .await?
        .iter()
        .filter_map(image_source)
        .collect();

    let image = images.first().cloned();
    if image.is_none() {
        missing.push("image");
    }

    let preview_images: Vec<String> = images
        .into_iter()
        .skip(1)
        .filter(|src| trusted_preview_host.map_or(true, |host| src.contains(host)))
        .collect();
    if preview_images.is_empty() {
        missing.push("previewImages");
    }

    let mut info = BTreeMap::new();
    for paragraph in page.query_all(INFO_SELECTOR).await? {
        merge_info_block(&mut info, &paragraph.text);
    }
    if info.is_empty() {
        missing.push("info");
    }

    let created_at = page
        .query_all(DATE_SELECTOR)
        .await?
        .first()
        .and_then(|el| parse_date(el.trimmed_text()).or_else(|| el.attr("datetime").and_then(parse_date)));
    if created_at.is_none() {
        missing.push("createdAt");
    }

    Ok(Extraction {
        record: PostRecord {
            title: Some(title),
            image,
            info,
            preview_images,
            created_at,
        },
        missing,
    })
}

fn first_text(elements: &[Element]) -> Option<String> {
    elements
        .iter()
        .map(Element::trimmed_text)
        .find(|t| !t.is_empty())
        .map(str::to_string)
}

// Lazy-loading themes move the real URL into data-src
fn image_source(element: &Element) -> Option<String> {
    ["src", "data-src", "data-lazy-src"]
        .iter()
        .filter_map(|name| element.attr(name))
        .map(str::trim)
        .find(|src| !src.is_empty() && !src.starts_with("data:"))
        .map(str::to_string)
}
