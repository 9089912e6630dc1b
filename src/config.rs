//! Run configuration for Tumblr-Mirror
//!
//! Configuration is assembled from command-line arguments by the binary and
//! validated here. Holding the parsed base URL (rather than just the blog
//! name) keeps the crawl engine pointable at arbitrary origins in tests.

use crate::MirrorError;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default spacing between outbound requests, in milliseconds.
pub const DEFAULT_MS_PER_REQUEST: u64 = 5000;

/// Default per-request timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration for a single mirror run
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Origin of the site being mirrored, e.g. `http://name.tumblr.com`
    pub base_url: Url,

    /// Path to the SQLite database file
    pub db_file: PathBuf,

    /// Minimum milliseconds between outbound requests
    pub ms_per_request: u64,

    /// HTTP request timeout
    pub request_timeout: Duration,
}

impl MirrorConfig {
    /// Builds a configuration for mirroring the named tumblr blog.
    pub fn for_tumblr(
        tumblr_name: &str,
        db_file: PathBuf,
        ms_per_request: u64,
        request_timeout: Duration,
    ) -> Result<Self, MirrorError> {
        if tumblr_name.is_empty() || tumblr_name.contains(['/', '.', ':']) {
            return Err(MirrorError::Config(format!(
                "invalid tumblr name: {:?}",
                tumblr_name
            )));
        }

        let base_url = Url::parse(&format!("http://{}.tumblr.com", tumblr_name))?;
        Self::new(base_url, db_file, ms_per_request, request_timeout)
    }

    /// Builds a configuration from an explicit base URL.
    pub fn new(
        base_url: Url,
        db_file: PathBuf,
        ms_per_request: u64,
        request_timeout: Duration,
    ) -> Result<Self, MirrorError> {
        if ms_per_request == 0 {
            return Err(MirrorError::Config(
                "request spacing must be at least 1 millisecond".to_string(),
            ));
        }

        if base_url.host_str().is_none() {
            return Err(MirrorError::Config(format!(
                "base URL has no host: {}",
                base_url
            )));
        }

        Ok(Self {
            base_url,
            db_file,
            ms_per_request,
            request_timeout,
        })
    }

    /// The robots.txt URL for the configured site.
    pub fn robots_url(&self) -> String {
        // base_url always has a host, so join cannot fail
        self.base_url
            .join("/robots.txt")
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("{}/robots.txt", self.base_url))
    }
}
