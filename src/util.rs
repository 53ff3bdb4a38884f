use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

// 日期转换工具
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a dataset date cell. Legacy rows may carry a `.csv` suffix.
pub fn parse_dataset_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let text = text.strip_suffix(".csv").unwrap_or(text).trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

// 去掉千位分隔符
pub fn strip_thousands(text: &str) -> String {
    text.trim().replace(',', "")
}

pub fn parse_price(text: &str) -> Option<Decimal> {
    let cleaned = strip_thousands(text);
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// Volume must be a non-negative whole number; `"12.0"` is accepted, `"12.5"` is not.
pub fn parse_volume(text: &str) -> Option<u64> {
    let cleaned = strip_thousands(text);
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(v) = cleaned.parse::<u64>() {
        return Some(v);
    }
    let d = Decimal::from_str(&cleaned).ok()?;
    if d.is_sign_negative() || !d.fract().is_zero() {
        return None;
    }
    d.trunc().to_u64()
}

// CSV数据集读写工具
pub mod csv_utils {
    use super::*;
    use crate::errors::{DataHubError, Result};
    use crate::models::record::DailyRecord;
    use csv::{ReaderBuilder, StringRecord, WriterBuilder};
    use log::debug;
    use std::fs::{self, File};
    use std::io::{Read, Seek, SeekFrom};
    use std::path::{Path, PathBuf};

    /// 读取整个数据集，所有字段按文本处理
    pub fn read_raw_rows(path: &Path) -> Result<(StringRecord, Vec<StringRecord>)> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(path)?;
        let headers = reader.headers()?.clone();
        let mut rows = Vec::new();
        for row in reader.records() {
            rows.push(row?);
        }
        debug!("Read {} rows from {}", rows.len(), path.display());
        Ok((headers, rows))
    }

    /// Header row of an existing dataset, `None` if the file is missing or empty
    pub fn read_header(path: &Path) -> Result<Option<StringRecord>> {
        if !path.exists() || fs::metadata(path)?.len() == 0 {
            return Ok(None);
        }
        let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(None);
        }
        Ok(Some(headers))
    }

    /// True when the file has content whose last byte is not a line break
    pub fn missing_final_newline(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        let mut file = File::open(path)?;
        let len = file.metadata()?.len();
        if len == 0 {
            return Ok(false);
        }
        file.seek(SeekFrom::Start(len - 1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] != b'\n')
    }

    pub fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
        headers.iter().position(|h| h.trim() == name)
    }

    /// 数据集中最新的交易日期，忽略无法解析的日期
    pub fn latest_date(path: &Path) -> Result<Option<NaiveDate>> {
        if read_header(path)?.is_none() {
            return Ok(None);
        }
        let (headers, rows) = read_raw_rows(path)?;
        let date_idx = column_index(&headers, "Date")
            .ok_or_else(|| DataHubError::DataError(format!("{} has no Date column", path.display())))?;

        Ok(rows
            .iter()
            .filter_map(|row| row.get(date_idx).and_then(parse_dataset_date))
            .max())
    }

    /// Replace the dataset with typed records via a temporary sibling file
    pub fn save_records_to_csv(records: &[DailyRecord], path: &Path) -> Result<()> {
        let tmp_path = temp_sibling(path);
        {
            let file = File::create(&tmp_path)?;
            let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);
            if records.is_empty() {
                writer.write_record(crate::models::record::DATASET_HEADERS)?;
            }
            for record in records {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    fn temp_sibling(path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        path.with_file_name(name)
    }
}
