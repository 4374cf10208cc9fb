// src/scrape.rs

use anyhow::{ensure, Context, Result};
use std::path::PathBuf;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument};

use crate::{
    config::ScrapeConfig,
    csv::write_csv,
    extract::{parse_page, TableSelectors},
    fetch::{fetch_with_retry, PageSource},
    table::{Row, TransactionTable},
};

/// Loop-local state: the accumulated table and where the next page starts.
#[derive(Debug, Default)]
pub struct ScrapeState {
    pub table: TransactionTable,
    pub offset: usize,
    pub pages: usize,
}

/// What one page did to the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// No rows on the page: nothing left to scrape.
    Exhausted,
    /// Fewer rows than a full page: this was the last one.
    LastPage(usize),
    /// A full page; keep going.
    Full(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub pages: usize,
    pub rows: usize,
    pub final_offset: usize,
    pub output_path: PathBuf,
}

/// Drives the fetch → extract → append → write loop over a [`PageSource`].
pub struct Scraper<S> {
    source: S,
    config: ScrapeConfig,
    selectors: TableSelectors,
    state: ScrapeState,
}

impl<S: PageSource> Scraper<S> {
    pub fn new(source: S, config: ScrapeConfig) -> Result<Self> {
        ensure!(config.page_size > 0, "page size must be at least 1");
        Ok(Self {
            source,
            config,
            selectors: TableSelectors::new()?,
            state: ScrapeState::default(),
        })
    }

    pub fn state(&self) -> &ScrapeState {
        &self.state
    }

    pub fn into_state(self) -> ScrapeState {
        self.state
    }

    /// Fetch the first page and take the table columns from its header.
    #[instrument(level = "info", skip(self))]
    pub async fn initialize(&mut self) -> Result<()> {
        let url = self.config.page_url(0)?;
        let body = fetch_with_retry(
            &self.source,
            &url,
            self.config.max_retries,
            self.config.initial_backoff,
        )
        .await
        .context("loading results header")?;

        let columns = self.selectors.extract_header(&parse_page(&body))?;
        info!(columns = columns.len(), "table columns discovered");
        self.state.table.initialize_columns(columns)
    }

    /// Fetch and extract the rows of the page at `offset`.
    #[instrument(level = "info", skip(self))]
    async fn scrape_page(&self, offset: usize) -> Result<Vec<Row>> {
        info!("Scraping transactions from start index {}", offset);

        let url = self.config.page_url(offset)?;
        let body = fetch_with_retry(
            &self.source,
            &url,
            self.config.max_retries,
            self.config.initial_backoff,
        )
        .await
        .with_context(|| format!("scraping page at start index {}", offset))?;

        let rows = self.selectors.extract_rows(&parse_page(&body));
        info!(rows = rows.len(), "Transactions scraped");
        Ok(rows)
    }

    /// Scrape the current offset, record its rows and advance the state.
    ///
    /// An empty page leaves both the table and the output file untouched.
    pub async fn step(&mut self) -> Result<PageOutcome> {
        let rows = self.scrape_page(self.state.offset).await?;
        if rows.is_empty() {
            return Ok(PageOutcome::Exhausted);
        }

        let count = rows.len();
        self.state
            .table
            .append_rows(rows)
            .with_context(|| format!("page at start index {}", self.state.offset))?;
        self.state.pages += 1;
        write_csv(&self.state.table, &self.config.output_path)?;

        if count < self.config.page_size {
            return Ok(PageOutcome::LastPage(count));
        }
        self.state.offset += self.config.page_size;
        Ok(PageOutcome::Full(count))
    }

    /// Scrape from offset 0 until a short or empty page.
    ///
    /// Starts from a fresh state on every call. Successive fetches start at
    /// least `crawl_delay` apart.
    pub async fn run(&mut self) -> Result<ScrapeSummary> {
        self.state = ScrapeState::default();
        self.initialize().await?;

        loop {
            let started = Instant::now();
            match self.step().await? {
                PageOutcome::Exhausted => {
                    info!(offset = self.state.offset, "no transactions on page");
                    break;
                }
                PageOutcome::LastPage(n) => {
                    info!(rows = n, "last page reached");
                    break;
                }
                PageOutcome::Full(_) => {
                    let elapsed = started.elapsed();
                    if let Some(wait) = self.config.crawl_delay.checked_sub(elapsed) {
                        debug!(wait_ms = wait.as_millis() as u64, "respecting crawl delay");
                        sleep(wait).await;
                    }
                }
            }
        }

        Ok(ScrapeSummary {
            pages: self.state.pages,
            rows: self.state.table.row_count(),
            final_offset: self.state.offset,
            output_path: self.config.output_path.clone(),
        })
    }
}
