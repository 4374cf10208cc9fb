use anyhow::Result;
use prosports_scraper::{HttpPageSource, ScrapeConfig, Scraper};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("BEGIN - Version: {}", env!("CARGO_PKG_VERSION"));

    // ─── 2) scrape every page into the CSV ───────────────────────────
    let result = run().await;

    match &result {
        Ok(()) => {}
        Err(e) => error!("{:#}", e),
    }
    info!("END");
    result
}

async fn run() -> Result<()> {
    let config = ScrapeConfig::default();
    let source = HttpPageSource::new(&config)?;
    let mut scraper = Scraper::new(source, config)?;

    let summary = scraper.run().await?;
    info!(
        pages = summary.pages,
        rows = summary.rows,
        output = %summary.output_path.display(),
        "all done"
    );
    Ok(())
}
