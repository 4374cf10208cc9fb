// src/config.rs

use anyhow::{Context, Result};
use std::{path::PathBuf, time::Duration};
use url::Url;

/// Search results for every basketball player movement, newest first.
pub const BASE_URL: &str = "http://prosportstransactions.com/basketball/Search/SearchResults.php?Player=&Team=&BeginDate=&EndDate=&PlayerMovementChkBx=yes&Submit=Search";

/// Rows the site serves per results page.
pub const TRANSACTIONS_PER_PAGE: usize = 25;

/// Minimum time between the start of two page fetches.
pub const CRAWL_DELAY: Duration = Duration::from_secs(30);

pub const OUTPUT_FILE: &str = "Output.csv";

const MAX_RETRIES: u32 = 5;
const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything the scrape loop needs to know up front.
///
/// `Default` carries the production constants; tests override individual fields.
#[derive(Clone, Debug)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub page_size: usize,
    pub crawl_delay: Duration,
    pub output_path: PathBuf,
    /// Retries of a single offset before the run is aborted.
    pub max_retries: u32,
    /// Backoff before the first retry; doubled on every further attempt.
    pub initial_backoff: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            page_size: TRANSACTIONS_PER_PAGE,
            crawl_delay: CRAWL_DELAY,
            output_path: PathBuf::from(OUTPUT_FILE),
            max_retries: MAX_RETRIES,
            initial_backoff: INITIAL_BACKOFF,
            request_timeout: REQUEST_TIMEOUT,
            user_agent: format!("prosports-scraper/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ScrapeConfig {
    /// URL of the results page starting at `offset`.
    ///
    /// Any `start` pair already present on the base URL is replaced.
    pub fn page_url(&self, offset: usize) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("parsing base URL {}", self.base_url))?;

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "start")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair("start", &offset.to_string());

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_sets_start_offset() -> Result<()> {
        let cfg = ScrapeConfig::default();
        let url = cfg.page_url(50)?;

        let start: Vec<String> = url
            .query_pairs()
            .filter(|(k, _)| k == "start")
            .map(|(_, v)| v.into_owned())
            .collect();
        assert_eq!(start, vec!["50"]);
        assert!(url.as_str().ends_with("&start=50"));
        assert!(url.as_str().contains("PlayerMovementChkBx=yes"));
        Ok(())
    }

    #[test]
    fn page_url_replaces_existing_start() -> Result<()> {
        let cfg = ScrapeConfig {
            base_url: "http://example.com/results.php?start=&Team=Lakers".to_string(),
            ..ScrapeConfig::default()
        };
        let url = cfg.page_url(25)?;
        assert_eq!(url.query(), Some("Team=Lakers&start=25"));
        Ok(())
    }

    #[test]
    fn bad_base_url_is_an_error() {
        let cfg = ScrapeConfig {
            base_url: "not a url".to_string(),
            ..ScrapeConfig::default()
        };
        assert!(cfg.page_url(0).is_err());
    }
}
