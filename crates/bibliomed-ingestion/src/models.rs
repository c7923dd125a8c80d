//! Data models for the collection pipeline.

use bibliomed_common::BibliomedError;
use serde::{Deserialize, Serialize};

/// Title used when a page or summary carries no title.
pub const TITLE_NOT_FOUND: &str = "title not found";
/// Title of a record whose page could not be scraped.
pub const SCRAPE_ERROR_TITLE: &str = "error";
/// Abstract of every index record; esummary does not return abstracts.
pub const ABSTRACT_UNAVAILABLE: &str = "Abstract not available via API.";

/// Column order shared by tabular exports and `Record::to_row`.
pub const COLUMNS: [&str; 6] = ["title", "date", "source", "abstract", "url", "summary"];

/// Where a record came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RecordSource {
    LiteratureIndex,
    Web,
}

impl RecordSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordSource::LiteratureIndex => "literature-index",
            RecordSource::Web             => "web",
        }
    }

    /// Human-facing label used in pages and reports.
    pub fn label(&self) -> &'static str {
        match self {
            RecordSource::LiteratureIndex => "PubMed",
            RecordSource::Web             => "Web",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "literature-index" => Some(RecordSource::LiteratureIndex),
            "web"              => Some(RecordSource::Web),
            _                  => None,
        }
    }
}

/// One collected reference. Every field is always present, possibly empty or a sentinel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    pub title: String,
    #[serde(rename = "date")]
    pub publication_date: String,
    pub source: RecordSource,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub url: String,
    #[serde(default)]
    pub summary: String,
}

impl Record {
    /// A literature-index hit. The abstract is always the unavailable sentinel.
    pub fn indexed(title: String, publication_date: String, url: String) -> Self {
        Self {
            title,
            publication_date,
            source: RecordSource::LiteratureIndex,
            abstract_text: ABSTRACT_UNAVAILABLE.to_string(),
            url,
            summary: String::new(),
        }
    }

    /// A successfully scraped page.
    pub fn scraped(title: String, abstract_text: String, url: String, collected_on: String) -> Self {
        Self {
            title,
            publication_date: collected_on,
            source: RecordSource::Web,
            abstract_text,
            url,
            summary: String::new(),
        }
    }

    /// A page that failed to scrape; the error description takes the abstract slot.
    pub fn scrape_error(url: String, description: String, collected_on: String) -> Self {
        Self {
            title: SCRAPE_ERROR_TITLE.to_string(),
            publication_date: collected_on,
            source: RecordSource::Web,
            abstract_text: description,
            url,
            summary: String::new(),
        }
    }

    pub fn is_scrape_error(&self) -> bool {
        self.source == RecordSource::Web && self.title == SCRAPE_ERROR_TITLE
    }

    /// Populate `summary` from `abstract`.
    pub fn with_summary(mut self) -> Self {
        self.summary = crate::summary::summarize(&self.abstract_text);
        self
    }

    /// Fields in `COLUMNS` order.
    pub fn to_row(&self) -> [String; 6] {
        [
            self.title.clone(),
            self.publication_date.clone(),
            self.source.as_str().to_string(),
            self.abstract_text.clone(),
            self.url.clone(),
            self.summary.clone(),
        ]
    }

    /// Rebuild a record from a row in `COLUMNS` order.
    pub fn from_row<S: AsRef<str>>(row: &[S]) -> Result<Self, BibliomedError> {
        let [title, date, source, abstract_text, url, summary] = row else {
            return Err(BibliomedError::InvalidRow(format!(
                "expected {} columns, got {}",
                COLUMNS.len(),
                row.len()
            )));
        };

        let source = RecordSource::parse(source.as_ref()).ok_or_else(|| {
            BibliomedError::InvalidRow(format!("unknown source tag '{}'", source.as_ref()))
        })?;

        Ok(Self {
            title: title.as_ref().to_string(),
            publication_date: date.as_ref().to_string(),
            source,
            abstract_text: abstract_text.as_ref().to_string(),
            url: url.as_ref().to_string(),
            summary: summary.as_ref().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_follows_column_order() {
        let record = Record::indexed(
            "Metformin and HbA1c".to_string(),
            "2023 Jan".to_string(),
            "https://pubmed.ncbi.nlm.nih.gov/1/".to_string(),
        );
        let row = record.to_row();
        assert_eq!(row[0], "Metformin and HbA1c");
        assert_eq!(row[1], "2023 Jan");
        assert_eq!(row[2], "literature-index");
        assert_eq!(row[3], ABSTRACT_UNAVAILABLE);
        assert_eq!(row[4], "https://pubmed.ncbi.nlm.nih.gov/1/");
        assert_eq!(row[5], "");

        assert_eq!(Record::from_row(&row).unwrap(), record);
    }

    #[test]
    fn test_from_row_rejects_bad_shapes() {
        let short = ["a", "b", "web"];
        assert!(matches!(Record::from_row(&short), Err(BibliomedError::InvalidRow(_))));

        let bad_source = ["t", "2024", "arxiv", "abs", "http://x", ""];
        let err = Record::from_row(&bad_source).unwrap_err();
        assert!(err.to_string().contains("unknown source tag 'arxiv'"));
    }

    #[test]
    fn test_scrape_error_record() {
        let record = Record::scrape_error(
            "http://bad.invalid".to_string(),
            "dns error".to_string(),
            "2026-10-16".to_string(),
        );
        assert!(record.is_scrape_error());
        assert_eq!(record.source, RecordSource::Web);
        assert_eq!(record.abstract_text, "dns error");
    }

    #[test]
    fn test_serde_uses_column_names() {
        let record = Record::scraped(
            "T".to_string(),
            "body".to_string(),
            "http://x".to_string(),
            "2026-10-16".to_string(),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2026-10-16");
        assert_eq!(json["abstract"], "body");
        assert_eq!(json["source"], "web");
    }
}
