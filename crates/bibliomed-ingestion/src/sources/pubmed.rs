//! PubMed E-utilities client.
//!
//! Endpoints used:
//!   esearch:  https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi
//!   esummary: https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esummary.fcgi
//!
//! A search is two steps: one esearch call maps the keyword to at most
//! `MAX_RESULTS` PMIDs, then one esummary call per PMID fetches title and
//! publication date.

use async_trait::async_trait;
use bibliomed_common::{BibliomedError, Result, SandboxClient as Client};
use bibliomed_config::PubMedConfig;
use futures::stream::{self, StreamExt};
use secrecy::ExposeSecret;
use tracing::{debug, info, instrument, warn};

use crate::models::{Record, TITLE_NOT_FOUND};
use super::LiteratureSource;

const EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
const PERMALINK_BASE: &str = "https://pubmed.ncbi.nlm.nih.gov/";

/// Upper bound on PMIDs requested (and kept) per search.
pub const MAX_RESULTS: usize = 10;

pub struct PubMedClient {
    client: Client,
    base_url: String,
    permalink_base: String,
    api_key: Option<String>,
    concurrency: usize,
}

impl PubMedClient {
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client: Client::new()?,
            base_url: EUTILS_BASE.to_string(),
            permalink_base: PERMALINK_BASE.to_string(),
            api_key,
            concurrency: 1,
        })
    }

    pub fn from_config(config: &PubMedConfig) -> Result<Self> {
        let api_key = config.api_key.as_ref().map(|k| k.expose_secret().to_string());
        Ok(Self::new(api_key)?
            .with_base_url(&config.base_url)?
            .with_permalink_base(&config.permalink_base)
            .with_concurrency(config.concurrency))
    }

    /// Point the client at another E-utilities base (a mirror or a test server).
    pub fn with_base_url(mut self, url: &str) -> Result<Self> {
        let parsed = reqwest::Url::parse(url)?;
        let host = parsed.host_str().ok_or_else(|| {
            BibliomedError::Config(format!("E-utilities base URL has no host: {}", url))
        })?;
        self.client.allow_domain(host)?;
        self.base_url = url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_permalink_base(mut self, base: &str) -> Self {
        self.permalink_base = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };
        self
    }

    /// Number of esummary calls in flight at once. Output order is unaffected.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Canonical link for a PMID.
    pub fn permalink(&self, pmid: &str) -> String {
        format!("{}{}/", self.permalink_base, pmid)
    }

    fn base_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("retmode", "json".to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }

    /// Search PubMed and return up to `MAX_RESULTS` PMIDs in rank order.
    #[instrument(skip(self))]
    async fn esearch(&self, query: &str) -> Result<Vec<String>> {
        let mut params = self.base_params();
        params.push(("term", query.to_string()));
        params.push(("retmax", MAX_RESULTS.to_string()));

        let resp: serde_json::Value = self.client
            .get(&format!("{}/esearch.fcgi", self.base_url))?
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut ids: Vec<String> = resp["esearchresult"]["idlist"]
            .as_array()
            .map(|list| list.iter().filter_map(|v| v.as_str().map(String::from)).collect())
            .unwrap_or_default();
        ids.truncate(MAX_RESULTS);

        debug!(?ids, "PubMed esearch returned PMIDs");
        Ok(ids)
    }

    /// Fetch title and publication date for one PMID.
    #[instrument(skip(self))]
    async fn esummary(&self, pmid: &str) -> Result<Record> {
        let mut params = self.base_params();
        params.push(("id", pmid.to_string()));

        let resp: serde_json::Value = self.client
            .get(&format!("{}/esummary.fcgi", self.base_url))?
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let info = &resp["result"][pmid];
        let title = info["title"]
            .as_str()
            .filter(|t| !t.is_empty())
            .unwrap_or(TITLE_NOT_FOUND)
            .to_string();
        let pub_date = info["pubdate"].as_str().unwrap_or_default().to_string();

        Ok(Record::indexed(title, pub_date, self.permalink(pmid)))
    }
}

#[async_trait]
impl LiteratureSource for PubMedClient {
    async fn search(&self, query: &str) -> Vec<Record> {
        let pmids = match self.esearch(query).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(query, error = %e, "PubMed esearch failed, returning no results");
                return Vec::new();
            }
        };

        let outcomes: Vec<(String, Result<Record>)> = stream::iter(pmids)
            .map(|pmid| async move {
                let outcome = self.esummary(&pmid).await;
                (pmid, outcome)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let requested = outcomes.len();
        let records: Vec<Record> = outcomes
            .into_iter()
            .filter_map(|(pmid, outcome)| match outcome {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(%pmid, error = %e, "PubMed esummary failed, skipping PMID");
                    None
                }
            })
            .collect();

        info!(query, requested, returned = records.len(), "PubMed search complete");
        records
    }
}
