//! Headless collection run: searches and a URL list in, CSV and PDF out.
//!
//! Run with: cargo run -p bibliomed-web --bin bibliomed-collect -- --search diabetes --csv out.csv

use bibliomed_config::Config;
use bibliomed_export::report::ReportOptions;
use bibliomed_ingestion::Collector;
use bibliomed_web::batch::{run, CollectArgs};
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = CollectArgs::parse();
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let collector = Collector::from_config(&config)?;
    let report = ReportOptions {
        title: config.export.report_title.clone(),
        include_summary: config.export.include_summary,
    };
    run(&args, &collector, &report).await?;
    Ok(())
}
