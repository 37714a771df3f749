//! Configuration module for Sitemap-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All settings have defaults, so running without a file crawls the default site.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawling {}", config.site.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, EngineKind, ExtractConfig, OutputConfig, SiteConfig, UserAgentConfig,
    WaitUntil,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
