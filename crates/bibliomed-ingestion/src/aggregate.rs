//! Append-only aggregation of collected records.
//!
//! The session's running collection only grows: new batches are concatenated
//! after existing records, never reordered, merged or deduplicated.

use serde::Serialize;

use crate::models::Record;

/// Concatenate `new` after `existing`.
pub fn append(mut existing: Vec<Record>, new: Vec<Record>) -> Vec<Record> {
    existing.extend(new);
    existing
}

/// A session's collected records, in arrival order.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Collection {
    records: Vec<Record>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the collection and return it with `batch` appended.
    pub fn append(self, batch: Vec<Record>) -> Self {
        Self { records: append(self.records, batch) }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl From<Vec<Record>> for Collection {
    fn from(records: Vec<Record>) -> Self {
        Self { records }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web(n: usize) -> Record {
        Record::scraped(
            format!("page {}", n),
            String::new(),
            format!("http://example.org/{}", n),
            "2026-10-16".to_string(),
        )
    }

    #[test]
    fn test_append_keeps_order_and_duplicates() {
        let a = vec![web(1), web(2)];
        let b = vec![web(2), web(3)];

        let merged = append(a.clone(), b.clone());
        assert_eq!(merged.len(), a.len() + b.len());
        let titles: Vec<_> = merged.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["page 1", "page 2", "page 2", "page 3"]);
    }

    #[test]
    fn test_append_is_associative() {
        let a = vec![web(1)];
        let b = vec![web(2), web(3)];
        let c = vec![web(4)];

        let left = append(append(a.clone(), b.clone()), c.clone());
        let right = append(a, append(b, c));
        assert_eq!(left, right);
    }

    #[test]
    fn test_collection_grows_across_batches() {
        let collection = Collection::new()
            .append(vec![web(1)])
            .append(Vec::new())
            .append(vec![web(2), web(1)]);

        assert_eq!(collection.len(), 3);
        assert_eq!(collection.records()[2].title, "page 1");
    }
}
