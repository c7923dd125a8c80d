//! bibliomed-export — Renders a record collection for download.
//!   - CSV table with the six record columns
//!   - Publication-year histogram
//!   - Paginated PDF report

pub mod table;
pub mod histogram;
pub mod report;

pub use histogram::{publication_year, YearHistogram};
pub use report::{render_pdf, ReportOptions};
pub use table::{read_csv, to_csv_bytes, write_csv};
