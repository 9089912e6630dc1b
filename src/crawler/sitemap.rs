//! Sitemap ingestion
//!
//! Turns the sitemap URLs advertised in robots.txt into the initial set of
//! known pages. Documents are parsed as XML and every `loc` element
//! contributes one canonicalized URL, keyed back to the sitemap that
//! listed it.

use crate::crawler::{Fetcher, KnownPages};
use crate::url::canonicalize;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Extracts the text of every `loc` element in a sitemap document.
///
/// Matching is on the local element name, so both plain and
/// namespace-prefixed sitemap documents work. A `loc` entry whose text
/// cannot be unescaped is skipped without aborting the document; a
/// document-level syntax error aborts with the parse error.
pub fn extract_locs(xml: &[u8]) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut in_loc = false;
    let mut locs = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(element) => {
                if element.local_name().as_ref() == b"loc" {
                    in_loc = true;
                }
            }
            Event::End(element) => {
                if element.local_name().as_ref() == b"loc" {
                    in_loc = false;
                }
            }
            Event::Text(text) => {
                if in_loc {
                    match text.unescape() {
                        Ok(loc) => locs.push(loc.into_owned()),
                        Err(error) => {
                            tracing::warn!("skipping malformed sitemap entry: {}", error);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(locs)
}

/// Fetches and parses each sitemap, seeding `known_pages` with its entries.
///
/// A parse failure skips just that sitemap; a fetch failure stops
/// processing the remaining sitemaps entirely.
pub async fn ingest_sitemaps(
    fetcher: &Fetcher,
    sitemap_urls: &[String],
    known_pages: &mut KnownPages,
) {
    tracing::info!("downloading site maps");

    for sitemap_url in sitemap_urls {
        let page = match fetcher.fetch(sitemap_url).await {
            Ok(page) => page,
            Err(error) => {
                tracing::warn!("problem retrieving sitemap {}: {}", sitemap_url, error);
                break;
            }
        };

        let locs = match extract_locs(&page.body) {
            Ok(locs) => locs,
            Err(error) => {
                tracing::warn!("problem parsing sitemap {}: {}", sitemap_url, error);
                continue;
            }
        };

        for loc in locs {
            known_pages.insert(canonicalize(&loc), sitemap_url.clone());
        }
    }
}
