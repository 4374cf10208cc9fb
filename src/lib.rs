pub mod config;
pub mod csv;
pub mod extract;
pub mod fetch;
pub mod scrape;
pub mod table;

pub use config::ScrapeConfig;
pub use fetch::{HttpPageSource, PageSource};
pub use scrape::{PageOutcome, ScrapeState, ScrapeSummary, Scraper};
pub use table::{Row, TransactionTable};
