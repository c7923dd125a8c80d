//! bibliomed-web — Web front end for Bibliomed
//! Provides a single-page research workspace with:
//!   - Keyword search against PubMed
//!   - Scraping of pasted article links
//!   - The session's collected records and a per-year breakdown
//!   - CSV and PDF downloads
//!   - An optional login gate
//!   - Headless collection runs for the `bibliomed-collect` binary

pub mod auth;
pub mod batch;
pub mod error;
pub mod handlers;
pub mod router;
pub mod session;
pub mod state;
pub mod templates;
