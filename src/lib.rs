//! Tumblr-Mirror: a polite single-site archiver
//!
//! This crate mirrors the public content of one tumblr blog into a local
//! SQLite database. Pages are discovered through the site's robots.txt and
//! sitemaps, then expanded breadth-first by following same-origin links,
//! with every outbound request gated through a shared rate limiter.

pub mod config;
pub mod crawler;
pub mod robots;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Tumblr-Mirror operations.
///
/// Only setup-phase failures surface through this type; everything that can
/// go wrong for a single page (fetch, parse, store) is logged and skipped
/// inside the crawl loop instead.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Could not read robots.txt from {url}: {source}")]
    Robots {
        url: String,
        source: crawler::FetchError,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Result type alias for Tumblr-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

// Re-export commonly used types
pub use config::MirrorConfig;
pub use crawler::{mirror, Mirror, MirrorStats};
pub use url::canonicalize;
