//! URL handling module for Sitemap-Harvest
//!
//! Post identifiers are the path of a post URL relative to the site base,
//! e.g. `https://example.com/game-a/` -> `game-a/`. They are the store keys.

use url::Url;

/// Returns true if `url` lies under `base_url`
///
/// `https://example.com/x` is under `https://example.com`, but
/// `https://example.community/x` is not.
pub fn is_under_base(url: &str, base_url: &str) -> bool {
    match url.strip_prefix(base_url) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

/// Strips `base_url` (and one following '/') from `url`
///
/// Returns `None` for URLs outside the site. The site root itself yields an
/// empty identifier, which the crawl driver skips.
///
/// # Examples
///
/// ```
/// use sitemap_harvest::url::post_identifier;
///
/// let id = post_identifier("https://example.com/game-a/", "https://example.com");
/// assert_eq!(id.as_deref(), Some("game-a/"));
/// assert_eq!(post_identifier("https://other.org/x/", "https://example.com"), None);
/// ```
pub fn post_identifier(url: &str, base_url: &str) -> Option<String> {
    if !is_under_base(url, base_url) {
        return None;
    }
    let rest = &url[base_url.len()..];
    Some(rest.strip_prefix('/').unwrap_or(rest).to_string())
}

/// Rebuilds the full post URL from its identifier
pub fn post_url(base_url: &str, identifier: &str) -> String {
    format!("{}/{}", base_url, identifier)
}

/// Builds the sitemap index URL from the site base and the index path
pub fn sitemap_index_url(base_url: &str, index_path: &str) -> Result<Url, url::ParseError> {
    Url::parse(base_url)?.join(index_path)
}

/// Resolves a possibly relative link against the page it was found on
///
/// Absolute http(s) links are returned as written, so identifiers cut from
/// them match the keys already in the store. Returns None for links that are
/// not http(s) after resolution.
pub fn resolve_link(href: &str, page_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if let Ok(absolute) = Url::parse(href) {
        return matches!(absolute.scheme(), "http" | "https").then(|| href.to_string());
    }

    match page_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}
