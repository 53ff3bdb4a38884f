use crate::errors::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Source of daily share price pages
#[async_trait]
pub trait DailySource {
    /// Short name of the site this source scrapes
    fn source_name(&self) -> &'static str;

    /// Open a session and return its anti-forgery token
    async fn fetch_token(&self) -> Result<String>;

    /// Fetch the raw price page markup for one trading date
    async fn fetch_day(&self, date: &NaiveDate, token: &str) -> Result<String>;
}
