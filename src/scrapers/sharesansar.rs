use crate::config::Config;
use crate::errors::{DataHubError, Result};
use crate::scrapers::base::DailySource;
use crate::scrapers::parser::selector;
use crate::util;
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
use reqwest::Client;
use scraper::Html;

const ALL_SECTORS: &str = "all_sec";

/// ShareSansar 今日股价抓取器
pub struct ShareSansarScraper {
    client: Client,
    landing_url: String,
    data_url: String,
}

impl ShareSansarScraper {
    /// The client keeps a cookie store so the token stays bound to its session.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(DataHubError::RequestError)?;

        Ok(Self {
            client,
            landing_url: config.landing_url(),
            data_url: config.data_url(),
        })
    }
}

/// `value` of the hidden `_token` input, if present and non-empty
pub fn extract_token(html: &str) -> Result<Option<String>> {
    let doc = Html::parse_document(html);
    let input = selector(r#"input[name="_token"]"#)?;
    Ok(doc
        .select(&input)
        .next()
        .and_then(|el| el.value().attr("value"))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

#[async_trait]
impl DailySource for ShareSansarScraper {
    fn source_name(&self) -> &'static str {
        "ShareSansar"
    }

    async fn fetch_token(&self) -> Result<String> {
        info!("获取会话令牌: {}", self.landing_url);

        let response = self.client
            .get(&self.landing_url)
            .send()
            .await?
            .error_for_status()?;
        let text = response.text().await?;

        extract_token(&text)?.ok_or_else(|| DataHubError::AuthTokenMissing(self.landing_url.clone()))
    }

    async fn fetch_day(&self, date: &NaiveDate, token: &str) -> Result<String> {
        let date_str = util::format_date(date);
        debug!("Requesting share prices for {}", date_str);

        let response = self.client
            .post(&self.data_url)
            .header("X-Requested-With", "XMLHttpRequest")
            .form(&[("_token", token), ("sector", ALL_SECTORS), ("date", date_str.as_str())])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }
}
