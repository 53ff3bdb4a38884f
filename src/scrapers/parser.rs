use crate::errors::{DataHubError, Result};
use crate::models::record::ScrapedRow;
use crate::util;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};

const HEADING_MARKER: &str = "As of :";
const NO_RECORDS_MARKER: &str = "No Record Found.";
const MIN_CELLS: usize = 9;

/// 单日页面的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Rows of the results table, possibly empty after skipping malformed rows
    Rows(Vec<ScrapedRow>),
    NoHeading,
    NoTable,
    NoRecords,
}

impl PageOutcome {
    /// Log message for the non-fatal empty outcomes
    pub fn signal(&self) -> Option<&'static str> {
        match self {
            PageOutcome::Rows(_) => None,
            PageOutcome::NoHeading => Some("No valid heading found"),
            PageOutcome::NoTable => Some("No table found"),
            PageOutcome::NoRecords => Some("No records found"),
        }
    }

    pub fn into_rows(self) -> Vec<ScrapedRow> {
        match self {
            PageOutcome::Rows(rows) => rows,
            _ => Vec::new(),
        }
    }
}

/// Extracts daily price rows from the "today share price" markup
pub struct PageParser {
    heading: Selector,
    date_label: Selector,
    table: Selector,
    body: Selector,
    row: Selector,
    cell: Selector,
}

impl PageParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            heading: selector("h5")?,
            date_label: selector("span.text-org")?,
            table: selector("table#headFixed")?,
            body: selector("tbody")?,
            row: selector("tr")?,
            cell: selector("td")?,
        })
    }

    /// Parse one day's page. `requested` is the fallback row date when the
    /// heading carries no date label.
    pub fn parse(&self, html: &str, requested: &NaiveDate) -> PageOutcome {
        let doc = Html::parse_document(html);

        let heading = match doc.select(&self.heading).next() {
            Some(h) if element_text(&h).contains(HEADING_MARKER) => h,
            _ => return PageOutcome::NoHeading,
        };

        // 页面上的日期优先于请求日期
        let row_date = heading
            .select(&self.date_label)
            .next()
            .map(|span| element_text(&span).trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| util::format_date(requested));

        let table = match doc.select(&self.table).next() {
            Some(t) => t,
            None => return PageOutcome::NoTable,
        };

        let rows: Vec<ElementRef> = match table.select(&self.body).next() {
            Some(body) => body.select(&self.row).collect(),
            None => Vec::new(),
        };
        match rows.first() {
            None => return PageOutcome::NoRecords,
            Some(first) if element_text(first).contains(NO_RECORDS_MARKER) => {
                return PageOutcome::NoRecords
            }
            _ => {}
        }

        let records = rows
            .iter()
            .filter_map(|row| {
                let cells: Vec<String> = row
                    .select(&self.cell)
                    .map(|td| element_text(&td).trim().to_string())
                    .collect();
                if cells.len() < MIN_CELLS || cells[1].is_empty() {
                    return None;
                }
                // columns 2 and 7 are display-only
                Some(ScrapedRow {
                    ordinal: cells[0].clone(),
                    symbol: cells[1].clone(),
                    date: row_date.clone(),
                    open: cells[3].clone(),
                    high: cells[4].clone(),
                    low: cells[5].clone(),
                    close: cells[6].clone(),
                    volume: cells[8].clone(),
                })
            })
            .collect();

        PageOutcome::Rows(records)
    }
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| DataHubError::DataError(format!("invalid selector {}: {}", css, e)))
}

fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>()
}
