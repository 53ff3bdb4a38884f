use crate::config::{CleanupMode, Config};
use crate::errors::Result;
use crate::scrapers::base::DailySource;
use crate::scrapers::parser::PageParser;
use crate::services::dataset_writer::DatasetWriter;
use crate::services::date_range::{self, DateRange};
use crate::services::normalizer::{self, NormalizeReport};
use crate::util::csv_utils;
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use rand::Rng;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// 一次运行的结果汇总
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub range: DateRange,
    pub dates_processed: usize,
    pub dates_failed: usize,
    pub rows_appended: usize,
    pub normalize: Option<NormalizeReport>,
}

/// 数据服务，按日期抓取、追加并规范化数据集
pub struct DataService {
    config: Config,
    source: Arc<dyn DailySource + Send + Sync>,
    parser: PageParser,
}

impl DataService {
    pub fn new(config: Config, source: Arc<dyn DailySource + Send + Sync>) -> Result<Self> {
        Ok(Self {
            config,
            source,
            parser: PageParser::new()?,
        })
    }

    pub fn output_path(&self) -> &Path {
        &self.config.output_file
    }

    /// Scrape every date from the resume point up to today, then normalize the
    /// dataset. Only token and dataset-level failures end the run early.
    pub async fn run(&self) -> Result<RunSummary> {
        let range = date_range::resolve_date_range(&self.config)?;
        let mut summary = RunSummary {
            range,
            dates_processed: 0,
            dates_failed: 0,
            rows_appended: 0,
            normalize: None,
        };

        if range.is_empty() {
            info!("Dataset already up to date (next date {} is after {})", range.start, range.end);
        } else {
            info!("Scraping {} from {} to {}", self.source.source_name(), range.start, range.end);
            self.scrape_range(&range, &mut summary).await?;
        }

        let path = self.output_path();
        if csv_utils::read_header(path)?.is_some() {
            summary.normalize = Some(normalizer::normalize_dataset(path)?);
            info!("Preprocessing data success. File saved to: {}", path.display());
        } else {
            info!("No data written to {}, skipping normalization", path.display());
        }

        info!(
            "NEPSE stocks scraped successfully from {} - {}. File saved to {}",
            range.start,
            range.end,
            path.display()
        );
        Ok(summary)
    }

    async fn scrape_range(&self, range: &DateRange, summary: &mut RunSummary) -> Result<()> {
        let token = self.source.fetch_token().await?;
        info!("Fetched CSRF token");
        debug!("token: {}", token);

        let mut writer = DatasetWriter::open(self.output_path(), self.config.include_ordinal)?;

        let (min_delay, max_delay) = self.config.delay_range_ms();
        for (i, date) in range.dates().enumerate() {
            let delay = delay_for(i, min_delay, max_delay, &mut rand::thread_rng());
            if let Some(delay) = delay {
                debug!("Waiting {} ms before next request", delay.as_millis());
                tokio::time::sleep(delay).await;
            }

            match self.process_date(&date, &token, &mut writer).await {
                Ok(count) => {
                    info!("Processed date: {}, found data: {} entries", date, count);
                    summary.dates_processed += 1;
                    summary.rows_appended += count;

                    if count > 0 && self.config.cleanup_mode == CleanupMode::Incremental {
                        // rows are already on disk; the final pass retries the cleanup
                        if let Err(e) = self.normalize_incremental(&mut writer) {
                            error!("Incremental normalization after {} failed: {}", date, e);
                        }
                    }
                }
                Err(e) => {
                    error!("Error processing date {}: {}", date, e);
                    summary.dates_failed += 1;
                }
            }
        }
        Ok(())
    }

    /// Fetch, parse and append a single date
    async fn process_date(&self, date: &NaiveDate, token: &str, writer: &mut DatasetWriter) -> Result<usize> {
        let html = self.source.fetch_day(date, token).await?;

        let outcome = self.parser.parse(&html, date);
        if let Some(signal) = outcome.signal() {
            warn!("{} for date: {}", signal, date);
        }
        let rows = outcome.into_rows();
        writer.append(&rows)
    }

    fn normalize_incremental(&self, writer: &mut DatasetWriter) -> Result<NormalizeReport> {
        let report = normalizer::normalize_dataset(writer.path())?;
        // normalization drops S.No, so re-read the layout
        *writer = DatasetWriter::open(self.output_path(), self.config.include_ordinal)?;
        Ok(report)
    }
}

// 随机等待，避免请求过于频繁
/// Delay before the `index`-th request of a run: none for the first request
/// or when `max` is 0, otherwise uniform in `[min, max]` milliseconds.
pub(crate) fn delay_for<R: Rng>(index: usize, min: u64, max: u64, rng: &mut R) -> Option<Duration> {
    if index == 0 || max == 0 {
        return None;
    }
    let (lo, hi) = (min.min(max), max.max(min));
    Some(Duration::from_millis(rng.gen_range(lo..=hi)))
}
