use url::Url;

/// Parsed robots.txt data for one run.
///
/// Immutable once built: the orchestrator fetches robots.txt exactly once
/// at the start of a run and consults this value for every URL after that.
#[derive(Debug, Clone, Default)]
pub struct RobotsInfo {
    sitemap_urls: Vec<String>,
    disallowed_prefixes: Vec<String>,
}

impl RobotsInfo {
    /// Parses robots.txt content line by line.
    ///
    /// Lines starting with `Sitemap: ` contribute to the sitemap list and
    /// lines starting with `Disallow: ` contribute to the disallowed-prefix
    /// list, both in file order. Every other line is ignored.
    pub fn parse(content: &str) -> Self {
        let mut sitemap_urls = Vec::new();
        let mut disallowed_prefixes = Vec::new();

        for line in content.lines() {
            if let Some(sitemap_url) = line.strip_prefix("Sitemap: ") {
                sitemap_urls.push(sitemap_url.to_string());
            } else if let Some(prefix) = line.strip_prefix("Disallow: ") {
                disallowed_prefixes.push(prefix.to_string());
            }
        }

        Self {
            sitemap_urls,
            disallowed_prefixes,
        }
    }

    /// Checks whether a URL may be fetched under this policy.
    ///
    /// Returns false when the URL's path starts with any disallowed prefix.
    /// A URL that cannot be parsed is treated as disallowed (fail closed).
    pub fn check_url(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(error) => {
                tracing::warn!("malformed URL {:?} passed to check_url: {}", url, error);
                return false;
            }
        };

        let path = parsed.path();
        !self
            .disallowed_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Sitemap URLs in the order they appeared in robots.txt.
    pub fn sitemap_urls(&self) -> &[String] {
        &self.sitemap_urls
    }

    /// Disallowed path prefixes in the order they appeared in robots.txt.
    pub fn disallowed_prefixes(&self) -> &[String] {
        &self.disallowed_prefixes
    }
}
