use chrono::NaiveDate;
use chrono_tz::Tz;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.sharesansar.com";
pub const DEFAULT_OUTPUT_FILE: &str = "NEPSE_STOCKS_DATASETS.csv";

/// 何时执行数据集规范化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupMode {
    /// Normalize once after the date loop
    Final,
    /// Normalize after every successful append, and once more after the loop
    Incremental,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub output_file: PathBuf,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub include_ordinal: bool,
    pub cleanup_mode: CleanupMode,
    min_delay_ms: u64,
    max_delay_ms: u64,
    pub request_timeout: Option<Duration>,
    pub timezone: Option<Tz>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            start_date: None,
            end_date: None,
            include_ordinal: false,
            cleanup_mode: CleanupMode::Final,
            min_delay_ms: 1000,
            max_delay_ms: 3000,
            request_timeout: None,
            timezone: None,
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_output_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_file = path.into();
        self
    }

    pub fn with_start_date(mut self, date: Option<NaiveDate>) -> Self {
        self.start_date = date;
        self
    }

    /// 覆盖"今天"作为结束日期
    pub fn with_end_date(mut self, date: Option<NaiveDate>) -> Self {
        self.end_date = date;
        self
    }

    pub fn with_ordinal_column(mut self, include: bool) -> Self {
        self.include_ordinal = include;
        self
    }

    pub fn with_cleanup_mode(mut self, mode: CleanupMode) -> Self {
        self.cleanup_mode = mode;
        self
    }

    pub fn with_delay_range_ms(mut self, min: u64, max: u64) -> Self {
        self.min_delay_ms = min.min(max);
        self.max_delay_ms = max.max(min);
        self
    }

    /// Inter-request delay bounds in milliseconds, always `min <= max`
    pub fn delay_range_ms(&self) -> (u64, u64) {
        (self.min_delay_ms, self.max_delay_ms)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.timezone = Some(tz);
        self
    }

    pub fn landing_url(&self) -> String {
        format!("{}/today-share-price", self.base_url)
    }

    pub fn data_url(&self) -> String {
        format!("{}/ajaxtodayshareprice", self.base_url)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
