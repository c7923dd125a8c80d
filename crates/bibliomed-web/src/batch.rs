//! Headless collection runs: searches and a URL list in, CSV and PDF out.
//!
//! Batches are appended to one `Collection` in a fixed order: every search in
//! the order given, then the URL file.

use std::path::PathBuf;

use anyhow::Context;
use bibliomed_export::report::ReportOptions;
use bibliomed_export::table::write_csv_file;
use bibliomed_export::render_pdf;
use bibliomed_ingestion::{parse_url_list, Collection, Collector};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug, Clone)]
#[command(name = "bibliomed-collect", version, about = "Collect PubMed and web references into CSV/PDF")]
pub struct CollectArgs {
    /// Keyword to search on PubMed; repeat for several searches
    #[arg(short, long = "search", value_name = "KEYWORD")]
    pub searches: Vec<String>,

    /// File with one article URL per line
    #[arg(short, long, value_name = "PATH")]
    pub urls_file: Option<PathBuf>,

    /// CSV output path
    #[arg(long, default_value = "references.csv")]
    pub csv: PathBuf,

    /// PDF report output path
    #[arg(long)]
    pub pdf: Option<PathBuf>,

    /// Config file (TOML or YAML); defaults to BIBLIOMED_CONFIG or ./bibliomed.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Collect everything `args` asks for, write the exports, and return the collection.
/// The PDF is written only when `args.pdf` is set.
pub async fn run(args: &CollectArgs, collector: &Collector, report: &ReportOptions) -> anyhow::Result<Collection> {
    let mut collection = Collection::new();

    for keyword in &args.searches {
        let batch = collector.search(keyword).await;
        info!(keyword = %keyword, count = batch.len(), "Search complete");
        collection = collection.append(batch);
    }

    if let Some(path) = &args.urls_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading URL list {}", path.display()))?;
        let urls = parse_url_list(&text);
        let batch = collector.scrape(&urls).await;
        info!(count = batch.len(), "Scrape complete");
        collection = collection.append(batch);
    }

    write_csv_file(collection.records(), &args.csv)
        .with_context(|| format!("writing {}", args.csv.display()))?;
    info!(path = %args.csv.display(), rows = collection.len(), "CSV written");

    if let Some(path) = &args.pdf {
        let bytes = render_pdf(collection.records(), report)?;
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "PDF written");
    }

    Ok(collection)
}
