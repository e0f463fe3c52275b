//! # Climate News Radar
//!
//! Scans syndicated news feeds for climate coverage of one region, ranks
//! it by weighted keyword relevance, and writes the result as CSV (plus an
//! optional JSON edition).
//!
//! ## Usage
//!
//! ```sh
//! climate_news_radar -o ./out
//! climate_news_radar -c profile.yaml --max-age-days 7 -j ./json
//! ```
//!
//! ## Architecture
//!
//! 1. **Ingestion**: Fetch and parse each RSS/Atom feed
//! 2. **Screening**: Recency, language and keyword gates per entry
//! 3. **Enrichment**: Fetch full article text for entries that pass
//! 4. **Scoring**: Combined topic × location relevance with a threshold
//! 5. **Ranking**: Deduplicate by headline, sort by relevance
//! 6. **Output**: CSV files, optional JSON edition, console summary

use chrono::{Local, Utc};
use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod enrich;
mod feeds;
mod filters;
mod keywords;
mod models;
mod outputs;
mod pipeline;
mod utils;

use cli::Cli;
use config::Config;
use enrich::{ContentEnricher, HttpContentFetcher};
use feeds::HttpFeedSource;
use models::Edition;
use outputs::summary::{Summary, TopResults};
use outputs::{csv, json};
use pipeline::Pipeline;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let started = Local::now();
    info!("climate_news_radar starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = Config::resolve(&args).await?;
    info!(
        feeds = config.feeds.len(),
        min_relevance_score = config.min_relevance_score,
        max_age_days = config.max_age().num_days(),
        concurrency = config.concurrency,
        enrich = config.enrich,
        "Configuration resolved"
    );

    // Fail before scanning if the results cannot be written
    ensure_writable_dir(&args.output_dir).await?;

    // ---- Scan, score, rank ----
    let source = HttpFeedSource::new(&config.fetch)?;
    let enricher = ContentEnricher::new(HttpContentFetcher::new(&config.fetch)?);
    let report = Pipeline::new(&config, source, enricher)
        .run(Utc::now())
        .await;

    let fetch_time = start_time.elapsed();
    println!(
        "Fetching completed in {:.2} seconds, found {} articles",
        fetch_time.as_secs_f64(),
        report.candidates.len()
    );

    if report.is_empty() {
        println!("\nNo relevant articles were found.");
        info!(elapsed_ms = fetch_time.as_millis() as u64, "Execution complete; no results");
        return Ok(());
    }

    // ---- CSV output ----
    let file_name = csv::results_file_name(started);
    let written = csv::write_results(
        Path::new(&args.output_dir),
        &file_name,
        &report.candidates,
        &config,
    )?;
    println!(
        "\nSaved {} unique articles to {}",
        report.candidates.len(),
        written.results.display()
    );

    // ---- JSON edition ----
    if let Some(json_output_dir) = &args.json_output_dir {
        let edition = Edition::new(started.naive_local(), report.candidates.clone());
        json::write_edition(&edition, json_output_dir).await?;
    }

    // ---- Console ----
    println!();
    print!(
        "{}",
        TopResults {
            candidates: &report.candidates,
            limit: args.top,
        }
    );
    println!(
        "{}",
        Summary {
            candidates: &report.candidates,
            config: &config,
        }
    );
    println!("Analysis saved to {}", written.analyzed.display());

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
