//! bibliomed-ingestion — Article collection and normalization pipeline.
//! - Keyword search against the PubMed E-utilities
//! - Best-effort scraping of user-supplied article pages
//! - Normalization into a uniform `Record`
//! - Summary truncation
//! - Append-only session aggregation

pub mod sources;
pub mod scrape;
pub mod summary;
pub mod aggregate;
pub mod models;
pub mod pipeline;

pub use aggregate::{append, Collection};
pub use models::{Record, RecordSource};
pub use pipeline::{parse_url_list, Collector};
pub use summary::summarize;
