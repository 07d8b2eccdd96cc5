//! # LA Times Scraper
//!
//! Searches the Los Angeles Times for a query, walks the results newest
//! first until articles fall outside a window of N calendar months, and
//! records each article's title, description, date, lead image, query
//! match count and whether it mentions money.
//!
//! ## Usage
//!
//! ```sh
//! latimes_scraper --query wildfire --section California --months 2 -o ./output
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: CLI flags, optional YAML scraper config, optional work-item payload
//! 2. **Navigation**: a headless Chromium session searches, sorts and filters
//! 3. **Extraction**: each promo on each page becomes a classified record; images are downloaded
//! 4. **Output**: the records are written as a dated JSON workbook

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{EnvFilter, fmt as tfmt, layer::SubscriberExt, util::SubscriberInitExt};

mod browser;
mod classify;
mod cli;
mod config;
mod error;
mod extractor;
mod media;
mod models;
mod outputs;
mod retriever;
mod utils;

use browser::chrome::ChromeLauncher;
use cli::Cli;
use config::{load_config, load_payload, normalize_months, search_parameters_from_payload};
use extractor::ArticleExtractor;
use media::HttpImageFetcher;
use models::SearchParameters;
use outputs::{json, table::ResultTable};
use retriever::NewsRetriever;
use utils::{ensure_writable_dir, open_log_file, workbook_filename};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    init_tracing(args.log_file.as_deref())?;

    let start_time = std::time::Instant::now();
    info!("latimes_scraper starting up");
    debug!(?args, "Parsed CLI arguments");

    // ---- Search parameters ----
    let params = search_parameters(&args)?;
    info!(query = %params.query, section = %params.section, months = params.months, "Search parameters");

    // ---- Scraper config ----
    let mut config = load_config(args.config.as_deref())?;
    if args.headed {
        config.headless = false;
    }
    if let Some(ref bin) = args.chrome_bin {
        config.chrome_executable = Some(bin.clone());
    }

    // ---- Output directories ----
    let images_dir = args.images_dir();
    ensure_writable_dir(&args.output_dir).await?;
    ensure_writable_dir(&images_dir).await?;

    // ---- Retrieve ----
    let launcher = ChromeLauncher::new(config)?;
    let client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let extractor = ArticleExtractor::new(HttpImageFetcher::new(client), images_dir);
    let retriever = NewsRetriever::new(launcher, extractor);

    let result = retriever.retrieve(&params).await?;
    info!(count = result.records.len(), stop = ?result.stop, "Retrieved news items");

    // ---- Output ----
    if result.records.is_empty() {
        info!("No articles in the requested window; nothing written");
    } else {
        let table: ResultTable = result.records.iter().collect();
        let filename = workbook_filename(&Local::now(), &params.query, &params.section);
        json::write_workbook(&table, &args.output_dir, &filename).await?;
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// Console logging, plus a plain-text copy appended to `log_file` when given.
fn init_tracing(log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console = tfmt::layer()
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(UtcTime::rfc_3339());
    let file = match log_file {
        Some(path) => Some(
            tfmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_timer(UtcTime::rfc_3339())
                .with_writer(Mutex::new(open_log_file(path)?)),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .init();
    Ok(())
}

/// Merge the work-item payload (if any) with command-line overrides.
fn search_parameters(args: &Cli) -> Result<SearchParameters, Box<dyn Error>> {
    let mut params = match args.payload {
        Some(ref path) => search_parameters_from_payload(&load_payload(path)?),
        None => SearchParameters::new("", "", 1),
    };
    if let Some(ref query) = args.query {
        params.query = query.clone();
    }
    if let Some(ref section) = args.section {
        params.section = section.clone();
    }
    if let Some(months) = args.months {
        params.months = normalize_months(months);
    }
    Ok(params)
}
