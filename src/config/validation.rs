use crate::config::types::{Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Longest cooldown accepted between post fetches
const MAX_DELAY_MS: u64 = 10 * 60 * 1000;

/// Shortest navigation timeout accepted
const MIN_NAVIGATION_TIMEOUT_MS: u64 = 1_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the site description
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.base_url.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "base_url '{}' must not end with '/'",
            config.base_url
        )));
    }

    if !config.sitemap_index_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "sitemap_index_path must start with '/', got '{}'",
            config.sitemap_index_path
        )));
    }

    if config.sitemap_marker.is_empty() {
        return Err(ConfigError::Validation(
            "sitemap_marker cannot be empty".to_string(),
        ));
    }

    // An empty pattern would match every identifier
    if config.exclude_patterns.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::Validation(
            "exclude_patterns cannot contain an empty pattern".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.delay_ms > MAX_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "delay_ms must be <= {}ms, got {}ms",
            MAX_DELAY_MS, config.delay_ms
        )));
    }

    if config.navigation_timeout_ms < MIN_NAVIGATION_TIMEOUT_MS {
        return Err(ConfigError::Validation(format!(
            "navigation_timeout_ms must be >= {}ms, got {}ms",
            MIN_NAVIGATION_TIMEOUT_MS, config.navigation_timeout_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    let paths = [
        ("store_path", &config.store_path),
        ("ignore_path", &config.ignore_path),
        ("schema_path", &config.schema_path),
    ];

    for (name, path) in &paths {
        if path.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    for (i, (name_a, path_a)) in paths.iter().enumerate() {
        for (name_b, path_b) in &paths[i + 1..] {
            if path_a == path_b {
                return Err(ConfigError::Validation(format!(
                    "{} and {} must point to different files",
                    name_a, name_b
                )));
            }
        }
    }

    Ok(())
}
