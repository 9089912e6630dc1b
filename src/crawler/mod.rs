//! Crawler module for page fetching and traversal
//!
//! This module contains the core mirroring logic:
//! - Rate-limited HTTP fetching
//! - Sitemap ingestion
//! - HTML link extraction
//! - Breadth-first crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod sitemap;

pub use coordinator::{Mirror, MirrorStats, Phase};
pub use fetcher::{FetchError, FetchedPage, Fetcher, RequestLimiter, USER_AGENT};
pub use parser::extract_links;
pub use sitemap::{extract_locs, ingest_sitemaps};

use crate::config::MirrorConfig;
use crate::MirrorError;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// The set of URLs discovered so far, each with the referrers that linked
/// to it.
///
/// Membership doubles as the dedup test for the work queue: a URL that is
/// already a key is never enqueued again, so each URL is fetched at most
/// once per run. The map only grows during a run and is rebuilt from the
/// sitemap on the next one.
#[derive(Debug, Default)]
pub struct KnownPages {
    pages: HashMap<String, HashSet<String>>,
}

impl KnownPages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a referrer edge, returning true when the URL was not known
    /// before this call.
    pub fn insert(&mut self, url: String, referrer: String) -> bool {
        match self.pages.entry(url) {
            Entry::Vacant(slot) => {
                slot.insert(HashSet::from([referrer]));
                true
            }
            Entry::Occupied(mut slot) => {
                slot.get_mut().insert(referrer);
                false
            }
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.pages.contains_key(url)
    }

    /// Referrers recorded for a URL, joined for log output.
    pub fn referrers(&self, url: &str) -> String {
        match self.pages.get(url) {
            Some(referrers) => {
                let mut sorted: Vec<&str> = referrers.iter().map(String::as_str).collect();
                sorted.sort_unstable();
                sorted.join(", ")
            }
            None => String::new(),
        }
    }

    pub fn urls(&self) -> impl Iterator<Item = &String> {
        self.pages.keys()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Runs a complete mirror operation for the configured site.
///
/// This is the main entry point: it opens the content store, reads the
/// site's robots.txt, seeds the frontier from the sitemaps, and drains the
/// work queue breadth-first until no undiscovered same-origin URL remains.
pub async fn mirror(config: MirrorConfig) -> Result<MirrorStats, MirrorError> {
    let mut mirror = Mirror::new(config)?;
    mirror.run().await
}
