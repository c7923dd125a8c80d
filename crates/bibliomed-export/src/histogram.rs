//! Publication-year histogram.
//!
//! Dates are free text ("2023 Jan 15", "2021", "2026-10-16"), so the year is
//! the first standalone four-digit number in 1500..=2999. Records without one
//! are left out of the chart.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use bibliomed_ingestion::models::Record;
use regex::Regex;
use serde::Serialize;

/// Bin count used by the report chart.
pub const DEFAULT_BINS: usize = 10;

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(1[5-9]\d{2}|2\d{3})\b").expect("year pattern is valid"));

pub fn publication_year(date: &str) -> Option<i32> {
    YEAR.captures(date)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn publication_years(records: &[Record]) -> Vec<i32> {
    records
        .iter()
        .filter_map(|r| publication_year(&r.publication_date))
        .collect()
}

/// Records per distinct year, ascending.
pub fn counts_by_year(records: &[Record]) -> BTreeMap<i32, usize> {
    let mut counts = BTreeMap::new();
    for year in publication_years(records) {
        *counts.entry(year).or_insert(0) += 1;
    }
    counts
}

/// Equal-width bins over `[lower, upper]`; the last bin is closed on the right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearHistogram {
    pub lower: f64,
    pub upper: f64,
    pub counts: Vec<usize>,
}

impl YearHistogram {
    /// `None` when there are no years or no bins.
    pub fn from_years(years: &[i32], bins: usize) -> Option<Self> {
        let min = *years.iter().min()?;
        let max = *years.iter().max()?;
        if bins == 0 {
            return None;
        }

        // A single distinct year gets a unit-wide range centred on it.
        let (lower, upper) = if min == max {
            (min as f64 - 0.5, max as f64 + 0.5)
        } else {
            (min as f64, max as f64)
        };

        let width = (upper - lower) / bins as f64;
        let mut counts = vec![0; bins];
        for &year in years {
            let idx = ((year as f64 - lower) / width).floor() as usize;
            counts[idx.min(bins - 1)] += 1;
        }

        Some(Self { lower, upper, counts })
    }

    pub fn from_records(records: &[Record], bins: usize) -> Option<Self> {
        Self::from_years(&publication_years(records), bins)
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Records counted across all bins.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}
