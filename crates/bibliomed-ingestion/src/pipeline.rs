//! Collection pipeline — wires the retriever and the scraper to summary population.
//!
//! Stages for one user action:
//!   1. Search the literature index, or scrape the given links
//!   2. Populate `summary` on each new record (when enabled)
//!   3. Hand the batch back for the caller to append to its `Collection`

use bibliomed_common::Result;
use bibliomed_config::Config;
use tracing::{info, instrument};

use crate::models::Record;
use crate::scrape::PageScraper;
use crate::sources::pubmed::PubMedClient;
use crate::sources::LiteratureSource;

pub struct Collector {
    index: Box<dyn LiteratureSource>,
    scraper: PageScraper,
    summaries: bool,
}

impl Collector {
    pub fn new(index: Box<dyn LiteratureSource>, scraper: PageScraper) -> Self {
        Self { index, scraper, summaries: true }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let index = PubMedClient::from_config(&config.pubmed)?;
        let scraper = PageScraper::new()?.with_concurrency(config.scraper.concurrency);
        Ok(Self::new(Box::new(index), scraper).with_summaries(config.collection.summaries))
    }

    pub fn with_summaries(mut self, enabled: bool) -> Self {
        self.summaries = enabled;
        self
    }

    pub fn summaries_enabled(&self) -> bool {
        self.summaries
    }

    /// Keyword search against the literature index.
    #[instrument(skip(self))]
    pub async fn search(&self, keyword: &str) -> Vec<Record> {
        let batch = self.index.search(keyword).await;
        info!(count = batch.len(), "Search batch collected");
        self.finish(batch)
    }

    /// Scrape a list of article links.
    #[instrument(skip(self, urls), fields(count = urls.len()))]
    pub async fn scrape(&self, urls: &[String]) -> Vec<Record> {
        let batch = self.scraper.scrape(urls).await;
        self.finish(batch)
    }

    fn finish(&self, batch: Vec<Record>) -> Vec<Record> {
        if self.summaries {
            batch.into_iter().map(Record::with_summary).collect()
        } else {
            batch
        }
    }
}

/// Split a pasted block of links into one URL per non-blank line.
///
/// Blank lines anywhere in the block, including between links, are dropped
/// and yield no record. They are not turned into `"error"` records.
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::models::ABSTRACT_UNAVAILABLE;

    struct FixedSource(Vec<Record>);

    #[async_trait]
    impl LiteratureSource for FixedSource {
        async fn search(&self, _query: &str) -> Vec<Record> {
            self.0.clone()
        }
    }

    fn fixed_collector() -> Collector {
        let record = Record::indexed(
            "Insulin resistance".to_string(),
            "2021".to_string(),
            "https://pubmed.ncbi.nlm.nih.gov/7/".to_string(),
        );
        Collector::new(Box::new(FixedSource(vec![record])), PageScraper::new().unwrap())
    }

    #[test]
    fn test_parse_url_list_trims_and_skips_blanks() {
        let urls = parse_url_list("  https://a.example/1  \n\n\thttps://b.example/2\r\n   \n");
        assert_eq!(urls, vec!["https://a.example/1", "https://b.example/2"]);
        assert!(parse_url_list("").is_empty());

        let urls = parse_url_list("https://a.example/1\n\n   \nnot a url\nhttps://b.example/2");
        assert_eq!(urls, vec!["https://a.example/1", "not a url", "https://b.example/2"]);
    }

    #[tokio::test]
    async fn test_search_populates_summary() {
        let records = fixed_collector().search("insulin").await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].summary, ABSTRACT_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_summaries_can_be_disabled() {
        let collector = fixed_collector().with_summaries(false);
        assert!(!collector.summaries_enabled());
        let records = collector.search("insulin").await;
        assert_eq!(records[0].summary, "");
    }
}
