//! PubMed retrieval against a mocked E-utilities server.
//!
//! Run with: cargo test --package bibliomed-ingestion --test test_pubmed_search

use std::time::Duration;

use bibliomed_ingestion::models::{RecordSource, ABSTRACT_UNAVAILABLE, TITLE_NOT_FOUND};
use bibliomed_ingestion::sources::pubmed::{PubMedClient, MAX_RESULTS};
use bibliomed_ingestion::sources::LiteratureSource;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_esearch(server: &MockServer, term: &str, ids: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .and(query_param("term", term))
        .and(query_param("retmax", "10"))
        .and(query_param("db", "pubmed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "esearchresult": { "count": ids.len().to_string(), "idlist": ids }
        })))
        .mount(server)
        .await;
}

fn summary_body(pmid: &str, title: &str, pubdate: &str) -> serde_json::Value {
    json!({
        "result": {
            "uids": [pmid],
            pmid: { "uid": pmid, "title": title, "pubdate": pubdate }
        }
    })
}

async fn mount_esummary(server: &MockServer, pmid: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/esummary.fcgi"))
        .and(query_param("id", pmid))
        .respond_with(response)
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> PubMedClient {
    PubMedClient::new(None)
        .unwrap()
        .with_base_url(&server.uri())
        .unwrap()
}

#[tokio::test]
async fn test_failed_summary_is_skipped() {
    let server = MockServer::start().await;
    mount_esearch(&server, "diabetes", &["1", "2"]).await;
    mount_esummary(
        &server,
        "1",
        ResponseTemplate::new(200).set_body_json(summary_body("1", "Metformin outcomes", "2023 Jan 5")),
    )
    .await;
    mount_esummary(&server, "2", ResponseTemplate::new(500)).await;

    let records = client_for(&server).search("diabetes").await;

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.title, "Metformin outcomes");
    assert_eq!(record.publication_date, "2023 Jan 5");
    assert_eq!(record.source, RecordSource::LiteratureIndex);
    assert_eq!(record.abstract_text, ABSTRACT_UNAVAILABLE);
    assert_eq!(record.url, "https://pubmed.ncbi.nlm.nih.gov/1/");
    assert_eq!(record.summary, "");
}

#[tokio::test]
async fn test_esearch_failure_yields_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/esearch.fcgi"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let records = client_for(&server).search("anything at all").await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_unreachable_index_yields_empty() {
    let client = PubMedClient::new(None)
        .unwrap()
        .with_base_url("http://127.0.0.1:1/entrez/eutils")
        .unwrap();
    assert!(client.search("diabetes").await.is_empty());
}

#[tokio::test]
async fn test_results_capped_and_ordered() {
    let server = MockServer::start().await;
    let ids: Vec<String> = (1..=12).map(|n| n.to_string()).collect();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    mount_esearch(&server, "oncology", &id_refs).await;
    for id in &ids {
        mount_esummary(
            &server,
            id,
            ResponseTemplate::new(200).set_body_json(summary_body(id, &format!("Paper {}", id), "2020")),
        )
        .await;
    }

    let records = client_for(&server).search("oncology").await;

    assert_eq!(records.len(), MAX_RESULTS);
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        ["Paper 1", "Paper 2", "Paper 3", "Paper 4", "Paper 5", "Paper 6", "Paper 7", "Paper 8", "Paper 9", "Paper 10"]
    );
    assert!(records.iter().all(|r| r.source == RecordSource::LiteratureIndex));
}

#[tokio::test]
async fn test_concurrent_summaries_keep_identifier_order() {
    let server = MockServer::start().await;
    mount_esearch(&server, "asthma", &["10", "20", "30"]).await;
    mount_esummary(
        &server,
        "10",
        ResponseTemplate::new(200)
            .set_body_json(summary_body("10", "Slow first", "2019"))
            .set_delay(Duration::from_millis(300)),
    )
    .await;
    mount_esummary(
        &server,
        "20",
        ResponseTemplate::new(200).set_body_json(summary_body("20", "Fast second", "2020")),
    )
    .await;
    mount_esummary(
        &server,
        "30",
        ResponseTemplate::new(200).set_body_json(summary_body("30", "Fast third", "2021")),
    )
    .await;

    let records = client_for(&server).with_concurrency(3).search("asthma").await;

    let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        [
            "https://pubmed.ncbi.nlm.nih.gov/10/",
            "https://pubmed.ncbi.nlm.nih.gov/20/",
            "https://pubmed.ncbi.nlm.nih.gov/30/",
        ]
    );
}

#[tokio::test]
async fn test_summary_without_title_uses_sentinel() {
    let server = MockServer::start().await;
    mount_esearch(&server, "rare", &["5"]).await;
    mount_esummary(
        &server,
        "5",
        ResponseTemplate::new(200).set_body_json(json!({ "result": { "uids": [] } })),
    )
    .await;

    let records = client_for(&server).search("rare").await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, TITLE_NOT_FOUND);
    assert_eq!(records[0].publication_date, "");
}

#[tokio::test]
#[ignore] // Requires network access
async fn test_live_pubmed_search() {
    let client = PubMedClient::new(None).unwrap();
    let records = client.search("diabetes").await;
    println!("Found {} records", records.len());
    for record in &records {
        println!("{} | {} | {}", record.title, record.publication_date, record.url);
    }
    assert!(records.len() <= MAX_RESULTS);
}
