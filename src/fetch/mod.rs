// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::ScrapeConfig;

/// Anything that can hand back the HTML body behind a URL.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch_page(&self, url: &Url) -> Result<String>;
}

impl<S: PageSource + ?Sized> PageSource for &S {
    async fn fetch_page(&self, url: &Url) -> Result<String> {
        (**self).fetch_page(url).await
    }
}

/// Plain HTTP GET over a shared `reqwest` client.
#[derive(Clone, Debug)]
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout)
            .gzip(true)
            .cookie_store(true)
            .build()
            .context("building HTTP client")?;
        Ok(Self { client })
    }
}

impl PageSource for HttpPageSource {
    async fn fetch_page(&self, url: &Url) -> Result<String> {
        debug!("Fetching text from {}", url);
        self.client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Non-success status {}", url))?
            .text()
            .await
            .with_context(|| format!("Reading text from {}", url))
    }
}

/// Backoff before retry number `attempt` (1-based); doubles every attempt.
pub fn backoff_delay(initial: Duration, attempt: u32) -> Duration {
    initial.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
}

/// Fetch `url`, retrying the same URL with exponential backoff.
///
/// Gives up after `max_retries` retries and returns the last error.
pub async fn fetch_with_retry<S: PageSource>(
    source: &S,
    url: &Url,
    max_retries: u32,
    initial_backoff: Duration,
) -> Result<String> {
    let mut attempts = 0;
    loop {
        match source.fetch_page(url).await {
            Ok(t) => return Ok(t),
            Err(e) if attempts < max_retries => {
                attempts += 1;
                let backoff = backoff_delay(initial_backoff, attempts);
                warn!(%url, attempt = attempts, delay_ms = backoff.as_millis() as u64, error = %e, "Retrying");
                sleep(backoff).await;
            }
            Err(e) => {
                error!(%url, error = %e, "Exhausted retries");
                return Err(e.context(format!("giving up on {} after {} retries", url, attempts)));
            }
        }
    }
}
