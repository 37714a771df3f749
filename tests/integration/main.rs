//! Integration tests for Sitemap-Harvest
//!
//! `crawl_tests` drives the static engine against a wiremock site;
//! `resume_tests` uses a scripted in-memory engine to check what survives
//! re-runs and interruptions; `migrate_tests` covers legacy store upgrades.

mod common;
mod crawl_tests;
mod migrate_tests;
mod resume_tests;
