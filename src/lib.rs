//! Sitemap-Harvest: a resumable single-site post crawler
//!
//! This crate walks a site's sitemap index, extracts a structured record for
//! every post it has not seen before, and persists the records incrementally to
//! a local JSON store so an interrupted crawl resumes where it stopped.

pub mod config;
pub mod crawler;
pub mod discovery;
pub mod extract;
pub mod migrate;
pub mod model;
pub mod output;
pub mod renderer;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sitemap-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Rendering engine error: {0}")]
    Render(#[from] renderer::RenderError),

    #[error("Extraction error: {0}")]
    Extract(#[from] extract::ExtractError),

    #[error("Discovery failed for {url}: {source}")]
    Discovery {
        url: String,
        source: renderer::RenderError,
    },

    #[error("Illegal crawl phase transition {from} -> {to}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Sitemap-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{InfoValue, PostRecord};
pub use state::{CrawlPhase, PostOutcome};
