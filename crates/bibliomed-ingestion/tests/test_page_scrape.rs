//! Page scraping against a mocked web server.
//!
//! Run with: cargo test --package bibliomed-ingestion --test test_page_scrape

use std::time::Duration;

use bibliomed_ingestion::models::{RecordSource, TITLE_NOT_FOUND};
use bibliomed_ingestion::scrape::PageScraper;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn collected_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

async fn mount_page(server: &MockServer, route: &str, status: u16, html: &str, delay_ms: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_raw(html.as_bytes().to_vec(), "text/html; charset=utf-8")
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_one_record_per_url_in_order() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/article",
        200,
        "<h1>Gut microbiome and obesity</h1><p>First.</p><p>Second.</p><p>Third.</p>",
        0,
    )
    .await;
    mount_page(&server, "/bare", 200, "<div>No markup of interest</div>", 0).await;

    let urls = vec![
        format!("{}/article", server.uri()),
        "ftp://example.org/not-http".to_string(),
        format!("{}/bare", server.uri()),
    ];

    let records = PageScraper::new().unwrap().scrape_on(&urls, collected_on()).await;

    assert_eq!(records.len(), urls.len());
    for (record, url) in records.iter().zip(&urls) {
        assert_eq!(&record.url, url);
        assert_eq!(record.source, RecordSource::Web);
        assert_eq!(record.publication_date, "2026-10-16");
    }

    assert_eq!(records[0].title, "Gut microbiome and obesity");
    assert_eq!(records[0].abstract_text, "First. Second. Third.");

    assert_eq!(records[1].title, "error");
    assert!(records[1].abstract_text.contains("scheme 'ftp' is not allowed"));

    assert_eq!(records[2].title, TITLE_NOT_FOUND);
    assert_eq!(records[2].abstract_text, "");
}

#[tokio::test]
async fn test_transport_failure_becomes_error_record() {
    let urls = vec!["http://127.0.0.1:1/unreachable".to_string()];

    let records = PageScraper::new().unwrap().scrape_on(&urls, collected_on()).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "error");
    assert_eq!(records[0].url, "http://127.0.0.1:1/unreachable");
    assert!(records[0].abstract_text.starts_with("HTTP request error:"));
}

#[tokio::test]
async fn test_non_success_status_still_extracted() {
    let server = MockServer::start().await;
    mount_page(&server, "/gone", 404, "<h1>Not Found</h1><p>The page is gone.</p>", 0).await;

    let urls = vec![format!("{}/gone", server.uri())];
    let records = PageScraper::new().unwrap().scrape_on(&urls, collected_on()).await;

    assert_eq!(records[0].title, "Not Found");
    assert_eq!(records[0].abstract_text, "The page is gone.");
}

#[tokio::test]
async fn test_concurrent_scrape_keeps_input_order() {
    let server = MockServer::start().await;
    mount_page(&server, "/slow", 200, "<h1>Slow</h1>", 300).await;
    mount_page(&server, "/fast", 200, "<h1>Fast</h1>", 0).await;

    let urls = vec![
        format!("{}/slow", server.uri()),
        format!("{}/fast", server.uri()),
    ];
    let records = PageScraper::new()
        .unwrap()
        .with_concurrency(2)
        .scrape_on(&urls, collected_on())
        .await;

    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, ["Slow", "Fast"]);
}

#[tokio::test]
async fn test_empty_input_gives_empty_output() {
    let records = PageScraper::new().unwrap().scrape(&[]).await;
    assert!(records.is_empty());
}
