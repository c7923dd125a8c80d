//! Literature source clients.

pub mod pubmed;

use async_trait::async_trait;
use crate::models::Record;

/// Common interface for literature index clients.
///
/// Failures never reach the caller: a source that cannot answer returns an
/// empty (or partial) list.
#[async_trait]
pub trait LiteratureSource: Send + Sync {
    /// Search the index for `query`, returning records in index order.
    async fn search(&self, query: &str) -> Vec<Record>;
}
