use nepse_datahub::config::{Config, DEFAULT_OUTPUT_FILE};
use nepse_datahub::scrapers::sharesansar::ShareSansarScraper;
use nepse_datahub::services::data_service::DataService;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Arg, Command};
use log::info;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let matches = Command::new("nepse_datahub")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Scrape NEPSE daily share prices into a single CSV dataset")
        .arg(
            Arg::new("output")
                .value_name("OUTPUT")
                .help("Dataset file to create or extend")
                .takes_value(true)
                .default_value(DEFAULT_OUTPUT_FILE),
        )
        .arg(
            Arg::new("start-date")
                .value_name("START_DATE")
                .help("First date to scrape (YYYY-MM-DD), ignored when the dataset already has data")
                .takes_value(true),
        )
        .get_matches();

    let output = matches.value_of("output").unwrap_or(DEFAULT_OUTPUT_FILE);
    let start_date = matches
        .value_of("start-date")
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("START_DATE must be YYYY-MM-DD")?;

    let config = Config::new()
        .with_output_file(output)
        .with_start_date(start_date);

    let scraper = ShareSansarScraper::new(&config).context("failed to build HTTP client")?;
    let data_service = DataService::new(config, Arc::new(scraper))?;

    let summary = data_service
        .run()
        .await
        .with_context(|| format!("scrape run for {} failed", data_service.output_path().display()))?;

    info!(
        "{} dates processed, {} failed, {} rows appended",
        summary.dates_processed, summary.dates_failed, summary.rows_appended
    );
    Ok(())
}
