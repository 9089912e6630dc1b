//! Rate-limited HTTP fetcher
//!
//! Every outbound request in a run, including robots.txt and the sitemaps,
//! goes through one `Fetcher` and therefore one shared `RequestLimiter`.
//! The fetcher performs a single GET per call and never retries; retry
//! policy belongs to the orchestrator, which currently skips failed URLs
//! for the rest of the run.

use crate::config::MirrorConfig;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Client identifier sent with every outbound request.
pub const USER_AGENT: &str = "TumblrMirror/0.1 (in-dev)";

/// Errors from a single fetch attempt
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error fetching {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("HTTP status {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("error reading body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },
}

/// A fully drained HTTP response
#[derive(Debug)]
pub struct FetchedPage {
    /// Declared Content-Type header, if any
    pub content_type: Option<String>,

    /// Complete response body
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// True when the declared content type contains `text/html`
    /// (case-insensitive). Pages without a Content-Type header are not
    /// treated as HTML.
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
            .unwrap_or(false)
    }
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Token-bucket rate limiter shared by all requests in a run.
///
/// Capacity is a single token, so requests are spaced at the configured
/// continuous rate rather than allowed to burst at window boundaries.
pub struct RequestLimiter {
    state: Mutex<BucketState>,
    refill_rate: f64,
}

impl RequestLimiter {
    /// Creates a limiter admitting `requests_per_second` requests.
    pub fn new(requests_per_second: f64) -> Self {
        Self {
            state: Mutex::new(BucketState {
                tokens: 1.0,
                last_refill: Instant::now(),
            }),
            refill_rate: requests_per_second,
        }
    }

    /// Creates a limiter spacing requests `ms_per_request` apart.
    pub fn per_millis(ms_per_request: u64) -> Self {
        Self::new(1000.0 / ms_per_request as f64)
    }

    /// Blocks until the limiter admits one request.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;

                let now = Instant::now();
                let elapsed = now.duration_since(state.last_refill).as_secs_f64();
                state.tokens = (state.tokens + elapsed * self.refill_rate).min(1.0);
                state.last_refill = now;

                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return;
                }

                let seconds_to_wait = (1.0 - state.tokens) / self.refill_rate;
                Duration::from_secs_f64(seconds_to_wait.max(0.001))
            };

            sleep(wait).await;
        }
    }
}

/// HTTP fetcher combining the shared client and the shared rate limiter
pub struct Fetcher {
    client: Client,
    limiter: RequestLimiter,
}

impl Fetcher {
    /// Builds a fetcher for the configured run.
    pub fn new(config: &MirrorConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            limiter: RequestLimiter::per_millis(config.ms_per_request),
        })
    }

    /// Performs one rate-limited GET and drains the body fully.
    ///
    /// Non-2xx responses and transport failures are both typed errors; the
    /// caller decides whether they abort the run (robots.txt) or just skip
    /// a URL (everything else).
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.limiter.acquire().await;
        tracing::info!("retrieving {}", url);

        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|source| FetchError::Transport {
                    url: url.to_string(),
                    source,
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Body {
                url: url.to_string(),
                source,
            })?
            .to_vec();

        Ok(FetchedPage { content_type, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_html_substring_case_insensitive() {
        let page = FetchedPage {
            content_type: Some("Text/HTML; charset=utf-8".to_string()),
            body: Vec::new(),
        };
        assert!(page.is_html());
    }

    #[test]
    fn test_is_html_rejects_other_types() {
        let page = FetchedPage {
            content_type: Some("image/png".to_string()),
            body: Vec::new(),
        };
        assert!(!page.is_html());
    }

    #[test]
    fn test_is_html_missing_header() {
        let page = FetchedPage {
            content_type: None,
            body: Vec::new(),
        };
        assert!(!page.is_html());
    }

    #[tokio::test(start_paused = true)]
    async fn test_limiter_spaces_requests() {
        // 10 requests/second means acquisitions 100ms apart after the
        // initial token.
        let limiter = RequestLimiter::new(10.0);
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_millis(200),
            "three acquisitions took only {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn test_limiter_first_acquire_is_immediate() {
        let limiter = RequestLimiter::per_millis(60_000);
        let start = std::time::Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_per_millis_rate() {
        let limiter = RequestLimiter::per_millis(5000);
        assert!((limiter.refill_rate - 0.2).abs() < f64::EPSILON);
    }
}
