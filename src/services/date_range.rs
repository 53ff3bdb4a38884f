use crate::config::Config;
use crate::errors::{DataHubError, Result};
use crate::util::csv_utils;
use chrono::{Local, NaiveDate, Utc};
use chrono_tz::Tz;
use log::info;
use std::path::Path;

/// Inclusive date range of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Lazy day-by-day walk from `start` to `end`
    pub fn dates(&self) -> DateSeries {
        DateSeries {
            next: Some(self.start),
            end: self.end,
        }
    }
}

/// Forward-only sequence of calendar days; clone it to restart.
#[derive(Debug, Clone)]
pub struct DateSeries {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for DateSeries {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next.filter(|d| *d <= self.end)?;
        self.next = current.succ_opt();
        Some(current)
    }
}

/// 当前日期：配置了交易所时区则使用该时区，否则使用本地时间
pub fn today(timezone: Option<Tz>) -> NaiveDate {
    match timezone {
        Some(tz) => Utc::now().with_timezone(&tz).date_naive(),
        None => Local::now().date_naive(),
    }
}

/// Start from the day after the newest date already on disk; otherwise use the
/// configured start date, falling back to a single-day run ending at `end`.
pub fn resolve_start_date(path: &Path, requested: Option<NaiveDate>, end: NaiveDate) -> Result<NaiveDate> {
    if let Some(latest) = csv_utils::latest_date(path)? {
        let resumed = latest
            .succ_opt()
            .ok_or_else(|| DataHubError::DataError(format!("Cannot advance past {}", latest)))?;
        info!("Existing dataset ends at {}, resuming from {}", latest, resumed);
        return Ok(resumed);
    }
    Ok(requested.unwrap_or(end))
}

pub fn resolve_date_range(config: &Config) -> Result<DateRange> {
    let end = config.end_date.unwrap_or_else(|| today(config.timezone));
    let start = resolve_start_date(&config.output_file, config.start_date, end)?;
    Ok(DateRange::new(start, end))
}
