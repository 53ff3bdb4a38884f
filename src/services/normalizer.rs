use crate::errors::{DataHubError, Result};
use crate::models::record::DailyRecord;
use crate::util::{self, csv_utils};
use chrono::NaiveDate;
use csv::StringRecord;
use log::info;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

/// 规范化统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub rows_read: usize,
    pub dropped_unparseable: usize,
    pub dropped_duplicates: usize,
    pub rows_written: usize,
}

impl fmt::Display for NormalizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows read, {} unparseable dropped, {} duplicates dropped, {} rows written",
            self.rows_read, self.dropped_unparseable, self.dropped_duplicates, self.rows_written
        )
    }
}

struct Columns {
    symbol: usize,
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            csv_utils::column_index(headers, name)
                .ok_or_else(|| DataHubError::DataError(format!("Dataset is missing column {}", name)))
        };
        Ok(Self {
            symbol: find("Symbol")?,
            date: find("Date")?,
            open: find("Open")?,
            high: find("High")?,
            low: find("Low")?,
            close: find("Close")?,
            volume: find("Vol")?,
        })
    }

    fn parse(&self, row: &StringRecord) -> Option<DailyRecord> {
        let symbol = row.get(self.symbol)?.trim();
        if symbol.is_empty() {
            return None;
        }
        Some(DailyRecord {
            symbol: symbol.to_string(),
            date: util::parse_dataset_date(row.get(self.date)?)?,
            open: util::parse_price(row.get(self.open)?)?,
            high: util::parse_price(row.get(self.high)?)?,
            low: util::parse_price(row.get(self.low)?)?,
            close: util::parse_price(row.get(self.close)?)?,
            volume: util::parse_volume(row.get(self.volume)?)?,
        })
    }
}

/// Type, filter, deduplicate and sort raw rows. Columns are found by header
/// name, so an `S.No` column is simply left behind.
pub fn normalize_rows(headers: &StringRecord, rows: &[StringRecord]) -> Result<(Vec<DailyRecord>, NormalizeReport)> {
    let columns = Columns::locate(headers)?;
    let mut report = NormalizeReport {
        rows_read: rows.len(),
        ..Default::default()
    };

    let parsed: Vec<DailyRecord> = rows.iter().filter_map(|row| columns.parse(row)).collect();
    report.dropped_unparseable = rows.len() - parsed.len();

    // 去除完全重复的行
    let mut seen = HashSet::new();
    let unique: Vec<DailyRecord> = parsed.into_iter().filter(|r| seen.insert(r.clone())).collect();

    // the last scrape of a (symbol, date) wins
    let mut last_index: HashMap<(&str, NaiveDate), usize> = HashMap::new();
    for (i, r) in unique.iter().enumerate() {
        last_index.insert((r.symbol.as_str(), r.date), i);
    }
    let mut keep: Vec<bool> = vec![false; unique.len()];
    for i in last_index.into_values() {
        keep[i] = true;
    }
    let mut records: Vec<DailyRecord> = unique
        .into_iter()
        .zip(keep)
        .filter_map(|(r, k)| k.then_some(r))
        .collect();
    report.dropped_duplicates = rows.len() - report.dropped_unparseable - records.len();

    records.sort_by(|a, b| a.symbol.cmp(&b.symbol).then(a.date.cmp(&b.date)));
    report.rows_written = records.len();

    Ok((records, report))
}

/// Rewrite the dataset file in normalized form
pub fn normalize_dataset(path: &Path) -> Result<NormalizeReport> {
    let (headers, rows) = csv_utils::read_raw_rows(path)?;
    let (records, report) = normalize_rows(&headers, &rows)?;
    csv_utils::save_records_to_csv(&records, path)?;
    info!("Normalized {}: {}", path.display(), report);
    Ok(report)
}
