//! Crawl coordinator - main mirror orchestration logic
//!
//! This module drives the breadth-first traversal:
//! - Bootstrapping the exclusion policy from robots.txt
//! - Seeding the frontier from the sitemaps
//! - Fetching, persisting, and expanding each queued URL
//! - Same-origin scoping of discovered links

use crate::config::MirrorConfig;
use crate::crawler::parser::extract_links;
use crate::crawler::sitemap::ingest_sitemaps;
use crate::crawler::{Fetcher, KnownPages};
use crate::robots::RobotsInfo;
use crate::storage::{ContentStore, SqliteStore};
use crate::MirrorError;
use std::collections::VecDeque;
use url::Url;

/// Lifecycle of a mirror run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    RobotsLoaded,
    SitemapLoaded,
    Crawling,
    Done,
    Failed,
}

/// Counters reported at the end of a run
#[derive(Debug, Default, Clone, Copy)]
pub struct MirrorStats {
    /// URLs fetched successfully
    pub pages_fetched: u64,

    /// URLs whose content reached the store
    pub pages_stored: u64,

    /// URLs skipped because the exclusion policy forbids them
    pub skipped_by_robots: u64,

    /// URLs abandoned after a fetch failure
    pub fetch_failures: u64,

    /// Same-origin links newly added to the frontier
    pub links_discovered: u64,
}

/// Orchestrates one mirror run.
///
/// All mutable traversal state (the known-page set and the work queue) is
/// owned here rather than shared, so several mirrors could run in the same
/// process without stepping on each other.
pub struct Mirror {
    config: MirrorConfig,
    fetcher: Fetcher,
    store: SqliteStore,
    known_pages: KnownPages,
    work_queue: VecDeque<String>,
    phase: Phase,
}

impl Mirror {
    /// Opens the content store and builds the fetcher for a run.
    ///
    /// Failing to open the store is a setup error: there is no point
    /// crawling anything we cannot persist.
    pub fn new(config: MirrorConfig) -> Result<Self, MirrorError> {
        tracing::info!("getting store connection");
        let store = SqliteStore::new(&config.db_file)?;
        let fetcher = Fetcher::new(&config)?;

        Ok(Self {
            config,
            fetcher,
            store,
            known_pages: KnownPages::new(),
            work_queue: VecDeque::new(),
            phase: Phase::Init,
        })
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Runs the mirror to completion.
    ///
    /// Only setup failures (robots.txt unreachable) abort; every per-page
    /// problem is logged and skipped, and the run ends when the work queue
    /// is empty.
    pub async fn run(&mut self) -> Result<MirrorStats, MirrorError> {
        tracing::info!("starting update sequence for {}", self.config.base_url);

        let robots = match self.load_robots().await {
            Ok(robots) => robots,
            Err(error) => {
                self.set_phase(Phase::Failed);
                return Err(error);
            }
        };
        self.set_phase(Phase::RobotsLoaded);

        ingest_sitemaps(&self.fetcher, robots.sitemap_urls(), &mut self.known_pages).await;
        self.work_queue = self.known_pages.urls().cloned().collect();
        self.set_phase(Phase::SitemapLoaded);
        tracing::info!("seeded frontier with {} pages", self.work_queue.len());

        self.set_phase(Phase::Crawling);
        let stats = self.download_pages(&robots).await;
        self.set_phase(Phase::Done);

        tracing::info!(
            "update sequence complete: {} fetched, {} stored, {} skipped by robots.txt, \
             {} fetch failures, {} links discovered, {} pages in store",
            stats.pages_fetched,
            stats.pages_stored,
            stats.skipped_by_robots,
            stats.fetch_failures,
            stats.links_discovered,
            self.store.count_pages().unwrap_or(0),
        );

        Ok(stats)
    }

    /// Fetches and parses robots.txt. Fatal on failure: no crawl without a
    /// known exclusion policy.
    async fn load_robots(&self) -> Result<RobotsInfo, MirrorError> {
        let robots_url = self.config.robots_url();
        tracing::info!("parsing robots.txt");

        let page = self
            .fetcher
            .fetch(&robots_url)
            .await
            .map_err(|source| MirrorError::Robots {
                url: robots_url.clone(),
                source,
            })?;

        Ok(RobotsInfo::parse(&String::from_utf8_lossy(&page.body)))
    }

    /// Drains the work queue, fetching, persisting, and expanding each URL.
    async fn download_pages(&mut self, robots: &RobotsInfo) -> MirrorStats {
        tracing::info!("downloading pages");
        let mut stats = MirrorStats::default();
        let mut processed: u64 = 0;

        while let Some(page_url) = self.work_queue.pop_front() {
            processed += 1;
            if processed % 10 == 0 {
                tracing::info!(
                    "progress: {} pages processed, {} in frontier, {} known",
                    processed,
                    self.work_queue.len(),
                    self.known_pages.len()
                );
            }

            if !robots.check_url(&page_url) {
                tracing::info!("ignoring {} due to robots.txt", page_url);
                stats.skipped_by_robots += 1;
                continue;
            }

            let fetched = match self.fetcher.fetch(&page_url).await {
                Ok(fetched) => fetched,
                Err(error) => {
                    tracing::warn!(
                        "problem retrieving content for {} (linked from {}): {}",
                        page_url,
                        self.known_pages.referrers(&page_url),
                        error
                    );
                    stats.fetch_failures += 1;
                    continue;
                }
            };
            stats.pages_fetched += 1;

            match self.store.set_content(&page_url, &fetched.body) {
                Ok(()) => stats.pages_stored += 1,
                Err(error) => {
                    // Not durable this run, but link discovery still happens.
                    tracing::warn!("error updating page store for {}: {}", page_url, error);
                }
            }

            if !fetched.is_html() {
                continue;
            }

            let base_url = match Url::parse(&page_url) {
                Ok(base_url) => base_url,
                Err(error) => {
                    tracing::warn!("error getting authority for {}: {}", page_url, error);
                    continue;
                }
            };
            let page_authority = base_url.authority().to_string();

            for link_url in extract_links(&base_url, &fetched.body) {
                let link_authority = match Url::parse(&link_url) {
                    Ok(link) => link.authority().to_string(),
                    Err(error) => {
                        tracing::debug!("error getting authority for {}: {}", link_url, error);
                        continue;
                    }
                };

                // The crawl never leaves the target site.
                if link_authority != page_authority {
                    continue;
                }

                if !self.known_pages.contains(&link_url) {
                    tracing::info!("queueing {} for download", link_url);
                    self.work_queue.push_back(link_url.clone());
                    stats.links_discovered += 1;
                }

                // Referrer edges accumulate even for already-known URLs.
                self.known_pages.insert(link_url, page_url.clone());
            }
        }

        stats
    }

    fn set_phase(&mut self, phase: Phase) {
        tracing::debug!("phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}
