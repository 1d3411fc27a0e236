mod config;
mod csv_writer;
mod error;
mod excel_writer;
mod extractor;
mod fetcher;
mod models;
mod pipeline;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{ScraperConfig, DEFAULT_LISTING_URL};
use crate::excel_writer::DEFAULT_SHEET;
use crate::fetcher::SortedScraper;
use crate::models::OutputLayout;
use crate::pipeline::Sink;

/// Export KiwiSaver fund fees and five-year returns from Sorted Smart Investor.
#[derive(Debug, Parser)]
#[command(name = "kiwisaver-scraper", version)]
struct Cli {
    /// Fund listing page to scrape
    #[arg(long, env = "KIWISAVER_URL", default_value = DEFAULT_LISTING_URL)]
    url: String,

    /// Show the browser window (env accepts 1/0, true/false, yes/no, on/off)
    #[arg(
        long,
        env = "KIWISAVER_HEADED",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    headed: bool,

    /// Seconds to wait for the modal and load-more controls to appear
    #[arg(long, env = "KIWISAVER_ELEMENT_WAIT_SECS", default_value_t = 20)]
    element_wait_secs: u64,

    /// Seconds to pause after each load-more click
    #[arg(long, env = "KIWISAVER_PAGINATION_DELAY_SECS", default_value_t = 5)]
    pagination_delay_secs: u64,

    /// Maximum number of load-more clicks
    #[arg(long, env = "KIWISAVER_MAX_PAGES", default_value_t = 100)]
    max_pages: usize,

    /// Read listing markup from a saved file instead of launching a browser
    #[arg(long, value_name = "FILE", conflicts_with = "save_html")]
    html: Option<PathBuf>,

    /// Save the fetched listing markup before extracting
    #[arg(long, value_name = "FILE")]
    save_html: Option<PathBuf>,

    /// Column layout of the output
    #[arg(long, value_enum, default_value_t = OutputLayout::Standard)]
    layout: OutputLayout,

    /// Directory for the timestamped CSV file
    #[arg(long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Write to this .xlsx workbook instead of CSV
    #[arg(long, value_name = "FILE")]
    excel: Option<PathBuf>,

    /// Worksheet name used with --excel
    #[arg(long, default_value = DEFAULT_SHEET, requires = "excel")]
    sheet: String,
}

impl Cli {
    fn scraper_config(&self) -> ScraperConfig {
        ScraperConfig {
            url: self.url.clone(),
            headless: !self.headed,
            element_wait: Duration::from_secs(self.element_wait_secs),
            pagination_delay: Duration::from_secs(self.pagination_delay_secs),
            max_pages: self.max_pages,
            ..ScraperConfig::default()
        }
    }

    fn sink(&self) -> Sink {
        match &self.excel {
            Some(path) => Sink::Excel {
                path: path.clone(),
                sheet: self.sheet.clone(),
            },
            None => Sink::Csv {
                dir: self.output_dir.clone(),
            },
        }
    }
}

async fn fetch_listing(config: ScraperConfig) -> Result<String> {
    if !config.headless {
        info!("Running in headed mode (browser visible)");
    }

    let scraper = SortedScraper::new(config).await?;
    let html = scraper.fetch_listing().await;
    let closed = scraper.close().await;
    finish_fetch(html, closed)
}

/// Keeps the fetch error when closing the browser fails as well.
fn finish_fetch(html: Result<String>, closed: Result<()>) -> Result<String> {
    match (html, closed) {
        (Ok(html), closed) => closed.map(|()| html),
        (Err(e), Err(close_err)) => {
            warn!("Failed to close browser: {:#}", close_err);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    info!("Starting");

    let html = match &cli.html {
        Some(path) => {
            info!("Loading saved listing from {}", path.display());
            pipeline::read_listing(path)?
        }
        None => fetch_listing(cli.scraper_config()).await?,
    };
    info!("Loaded HTML ({} bytes)", html.len());

    if let Some(path) = &cli.save_html {
        std::fs::write(path, &html)
            .with_context(|| format!("Failed to save markup to {}", path.display()))?;
        info!("Saved listing markup to {}", path.display());
    }

    let summary = pipeline::export(&html, cli.layout, &cli.sink(), Local::now().naive_local())?;
    info!(
        "Done! Exported {} funds to {}",
        summary.funds,
        summary.path.display()
    );

    Ok(())
}
