//! Best-effort article scraping for user-supplied links.
//!
//! Each URL yields exactly one record, in input order. The title is the first
//! `<h1>`, the abstract is the first five `<p>` blocks joined by spaces, and the
//! date is the collection date. Any per-URL failure becomes an `"error"` record
//! carrying the failure text; nothing aborts the batch.

use bibliomed_common::{BibliomedError, Result, SandboxClient as Client};
use chrono::{Local, NaiveDate};
use futures::stream::{self, StreamExt};
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};

use crate::models::{Record, TITLE_NOT_FOUND};

/// Paragraph blocks kept per page.
pub const MAX_PARAGRAPHS: usize = 5;

/// What a page yielded before it becomes a `Record`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedPage {
    pub title: String,
    pub abstract_text: String,
}

pub struct PageScraper {
    client: Client,
    concurrency: usize,
}

impl PageScraper {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: Client::web()?,
            concurrency: 1,
        })
    }

    /// Number of pages fetched at once. Output order is unaffected.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Scrape `urls`, stamping records with today's local date.
    pub async fn scrape(&self, urls: &[String]) -> Vec<Record> {
        self.scrape_on(urls, Local::now().date_naive()).await
    }

    /// Scrape `urls`, stamping records with `collected_on`.
    pub async fn scrape_on(&self, urls: &[String], collected_on: NaiveDate) -> Vec<Record> {
        let date = collected_on.format("%Y-%m-%d").to_string();

        let outcomes: Vec<(String, Result<ScrapedPage>)> = stream::iter(urls.iter().cloned())
            .map(|url| async move {
                let outcome = self.fetch_page(&url).await;
                (url, outcome)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let records: Vec<Record> = outcomes
            .into_iter()
            .map(|(url, outcome)| match outcome {
                Ok(page) => Record::scraped(page.title, page.abstract_text, url, date.clone()),
                Err(e) => {
                    warn!(%url, error = %e, "Scrape failed, recording error");
                    Record::scrape_error(url, e.to_string(), date.clone())
                }
            })
            .collect();

        let failed = records.iter().filter(|r| r.is_scrape_error()).count();
        info!(pages = records.len(), failed, "Scrape batch complete");
        records
    }

    #[instrument(skip(self))]
    async fn fetch_page(&self, url: &str) -> Result<ScrapedPage> {
        let resp = self.client.get(url)?.send().await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%status, "Page returned non-success status, extracting anyway");
        }

        let html = resp.text().await?;
        debug!(bytes = html.len(), "Fetched page");
        extract_page(&html)
    }
}

/// Pull the title and leading paragraphs out of an HTML document.
pub fn extract_page(html: &str) -> Result<ScrapedPage> {
    let document = Html::parse_document(html);
    let heading = selector("h1")?;
    let paragraph = selector("p")?;

    let title = document
        .select(&heading)
        .next()
        .map(|h| h.text().collect::<String>())
        .unwrap_or_else(|| TITLE_NOT_FOUND.to_string());

    let abstract_text = document
        .select(&paragraph)
        .take(MAX_PARAGRAPHS)
        .map(|p| p.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ");

    Ok(ScrapedPage { title, abstract_text })
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| BibliomedError::Other(anyhow::anyhow!("invalid selector {}: {}", css, e)))
}
