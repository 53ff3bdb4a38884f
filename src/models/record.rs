use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const ORDINAL_HEADER: &str = "S.No";
pub const DATASET_HEADERS: [&str; 7] = ["Symbol", "Date", "Open", "High", "Low", "Close", "Vol"];

/// 页面解析出的一行原始数据，数值保持文本形式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedRow {
    pub ordinal: String,
    pub symbol: String,
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

impl ScrapedRow {
    /// Field values in dataset column order, optionally led by the ordinal
    pub fn to_fields(&self, with_ordinal: bool) -> Vec<&str> {
        let mut fields = Vec::with_capacity(8);
        if with_ordinal {
            fields.push(self.ordinal.as_str());
        }
        fields.extend([
            self.symbol.as_str(),
            self.date.as_str(),
            self.open.as_str(),
            self.high.as_str(),
            self.low.as_str(),
            self.close.as_str(),
            self.volume.as_str(),
        ]);
        fields
    }
}

/// 规范化后的日线数据
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DailyRecord {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: Decimal,
    #[serde(rename = "High")]
    pub high: Decimal,
    #[serde(rename = "Low")]
    pub low: Decimal,
    #[serde(rename = "Close")]
    pub close: Decimal,
    #[serde(rename = "Vol")]
    pub volume: u64,
}
