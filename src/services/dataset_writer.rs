use crate::errors::Result;
use crate::models::record::{ScrapedRow, DATASET_HEADERS, ORDINAL_HEADER};
use crate::util::csv_utils;
use csv::WriterBuilder;
use log::debug;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// 增量追加每日数据到CSV数据集
pub struct DatasetWriter {
    path: PathBuf,
    with_ordinal: bool,
    header_written: bool,
}

impl DatasetWriter {
    /// An existing header decides whether rows carry the ordinal column;
    /// `include_ordinal` only applies to a new file.
    pub fn open(path: &Path, include_ordinal: bool) -> Result<Self> {
        let (with_ordinal, header_written) = match csv_utils::read_header(path)? {
            Some(headers) => (csv_utils::column_index(&headers, ORDINAL_HEADER).is_some(), true),
            None => (include_ordinal, false),
        };
        Ok(Self {
            path: path.to_path_buf(),
            with_ordinal,
            header_written,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn with_ordinal(&self) -> bool {
        self.with_ordinal
    }

    /// Append one day's rows. Nothing is written for an empty day.
    pub fn append(&mut self, rows: &[ScrapedRow]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        // an unterminated last line would swallow the first appended row
        let needs_newline = csv_utils::missing_final_newline(&self.path)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        if needs_newline {
            file.write_all(b"\n")?;
        }
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        if !self.header_written {
            let mut headers: Vec<&str> = Vec::with_capacity(8);
            if self.with_ordinal {
                headers.push(ORDINAL_HEADER);
            }
            headers.extend(DATASET_HEADERS);
            writer.write_record(&headers)?;
        }
        for row in rows {
            writer.write_record(row.to_fields(self.with_ordinal))?;
        }
        writer.flush()?;
        self.header_written = true;

        debug!("Appended {} rows to {}", rows.len(), self.path.display());
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scraped(ordinal: &str, symbol: &str, date: &str) -> ScrapedRow {
        ScrapedRow {
            ordinal: ordinal.to_string(),
            symbol: symbol.to_string(),
            date: date.to_string(),
            open: "1,000".to_string(),
            high: "1,010".to_string(),
            low: "990".to_string(),
            close: "1,005".to_string(),
            volume: "2,500".to_string(),
        }
    }

    #[test]
    fn header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");

        let mut writer = DatasetWriter::open(&path, false).unwrap();
        writer.append(&[scraped("1", "ABC", "2024-01-01")]).unwrap();
        writer.append(&[scraped("1", "ABC", "2024-01-02")]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Symbol,Date,Open,High,Low,Close,Vol\n\
             ABC,2024-01-01,\"1,000\",\"1,010\",990,\"1,005\",\"2,500\"\n\
             ABC,2024-01-02,\"1,000\",\"1,010\",990,\"1,005\",\"2,500\"\n"
        );
    }

    #[test]
    fn empty_day_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");

        let mut writer = DatasetWriter::open(&path, false).unwrap();
        assert_eq!(writer.append(&[]).unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn later_runs_append_without_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");

        DatasetWriter::open(&path, false).unwrap().append(&[scraped("1", "ABC", "2024-01-01")]).unwrap();
        DatasetWriter::open(&path, false).unwrap().append(&[scraped("1", "XYZ", "2024-01-02")]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("Symbol,Date").count(), 1);
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn terminates_unfinished_last_line_before_appending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(&path, "Symbol,Date,Open,High,Low,Close,Vol\nABC,2024-01-05,1,1,1,1,1").unwrap();

        let mut writer = DatasetWriter::open(&path, false).unwrap();
        writer.append(&[scraped("1", "XYZ", "2024-01-06")]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Symbol,Date,Open,High,Low,Close,Vol\n\
             ABC,2024-01-05,1,1,1,1,1\n\
             XYZ,2024-01-06,\"1,000\",\"1,010\",990,\"1,005\",\"2,500\"\n"
        );

        let report = crate::services::normalizer::normalize_dataset(&path).unwrap();
        assert_eq!(report.rows_written, 2);
        assert_eq!(report.dropped_unparseable, 0);
    }

    #[test]
    fn ordinal_column_follows_existing_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");

        let mut writer = DatasetWriter::open(&path, true).unwrap();
        writer.append(&[scraped("7", "ABC", "2024-01-01")]).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("S.No,Symbol,Date"));

        // a file without S.No keeps its layout even if the ordinal is requested
        let plain = dir.path().join("plain.csv");
        fs::write(&plain, "Symbol,Date,Open,High,Low,Close,Vol\n").unwrap();
        let mut writer = DatasetWriter::open(&plain, true).unwrap();
        assert!(!writer.with_ordinal());
        writer.append(&[scraped("7", "ABC", "2024-01-01")]).unwrap();
        let content = fs::read_to_string(&plain).unwrap();
        assert_eq!(content.lines().nth(1), Some("ABC,2024-01-01,\"1,000\",\"1,010\",990,\"1,005\",\"2,500\""));
    }
}
