use chrono::NaiveDate;
use nepse_datahub::{Config, DailySource, DataHubError, DataService, ShareSansarScraper};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LANDING: &str = r#"<html><body>
<form id="frm_todayshareprice">
  <input type="hidden" name="_token" value="tok123">
  <input type="text" name="date" value="2024-01-02">
</form>
</body></html>"#;

const DAY_PAGE: &str = r#"<h5>As of : <span class="text-org">2024-01-02</span></h5>
<table id="headFixed">
  <thead><tr><th>S.No</th><th>Symbol</th></tr></thead>
  <tbody>
    <tr><td>1</td><td><a href="/company/abc">ABC</a></td><td>Abc Bank</td>
        <td>100.5</td><td>105.0</td><td>99.0</td><td>102.0</td><td>x</td><td>1,234</td></tr>
  </tbody>
</table>"#;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

async fn mount_landing(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/today-share-price"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "sharesansar_session=abc; Path=/")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn token_comes_from_landing_page() {
    let server = MockServer::start().await;
    mount_landing(&server, LANDING).await;

    let config = Config::new().with_base_url(&server.uri());
    let scraper = ShareSansarScraper::new(&config).unwrap();
    assert_eq!(scraper.fetch_token().await.unwrap(), "tok123");
}

#[tokio::test]
async fn landing_page_without_token_fails() {
    let server = MockServer::start().await;
    mount_landing(&server, "<html><body>maintenance</body></html>").await;

    let config = Config::new().with_base_url(&server.uri());
    let scraper = ShareSansarScraper::new(&config).unwrap();
    let err = scraper.fetch_token().await.unwrap_err();
    assert!(matches!(err, DataHubError::AuthTokenMissing(_)));
}

#[tokio::test]
async fn day_request_carries_session_and_form() {
    let server = MockServer::start().await;
    mount_landing(&server, LANDING).await;
    Mock::given(method("POST"))
        .and(path("/ajaxtodayshareprice"))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .and(header("cookie", "sharesansar_session=abc"))
        .and(body_string_contains("_token=tok123"))
        .and(body_string_contains("sector=all_sec"))
        .and(body_string_contains("date=2024-01-02"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DAY_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config::new().with_base_url(&server.uri());
    let scraper = ShareSansarScraper::new(&config).unwrap();
    let token = scraper.fetch_token().await.unwrap();
    let html = scraper.fetch_day(&date("2024-01-02"), &token).await.unwrap();
    assert!(html.contains("headFixed"));
}

#[tokio::test]
async fn request_timeout_applies_to_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/today-share-price"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(LANDING)
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = Config::new()
        .with_base_url(&server.uri())
        .with_request_timeout(Duration::from_millis(50));
    let scraper = ShareSansarScraper::new(&config).unwrap();
    match scraper.fetch_token().await {
        Err(DataHubError::RequestError(e)) => assert!(e.is_timeout()),
        other => panic!("expected a timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn server_error_is_reported_for_the_day() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ajaxtodayshareprice"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = Config::new().with_base_url(&server.uri());
    let scraper = ShareSansarScraper::new(&config).unwrap();
    let err = scraper.fetch_day(&date("2024-01-02"), "tok").await.unwrap_err();
    assert!(matches!(err, DataHubError::RequestError(_)));
}

#[tokio::test]
async fn full_run_against_site() {
    let server = MockServer::start().await;
    mount_landing(&server, LANDING).await;
    Mock::given(method("POST"))
        .and(path("/ajaxtodayshareprice"))
        .respond_with(ResponseTemplate::new(200).set_body_string(DAY_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("NEPSE_STOCKS_DATASETS.csv");
    let config = Config::new()
        .with_base_url(&server.uri())
        .with_output_file(&output)
        .with_start_date(Some(date("2024-01-02")))
        .with_end_date(Some(date("2024-01-02")))
        .with_delay_range_ms(0, 0);

    let scraper = ShareSansarScraper::new(&config).unwrap();
    let service = DataService::new(config, Arc::new(scraper)).unwrap();
    service.run().await.unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "Symbol,Date,Open,High,Low,Close,Vol\nABC,2024-01-02,100.5,105.0,99.0,102.0,1234\n"
    );
}
