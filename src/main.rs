mod changes;
mod cli;
mod models;
mod pipeline;
mod publish;
mod scrapers;
mod snapshot;

use anyhow::Context;
use clap::Parser;
use cli::{Args, Command};
use publish::{Publisher, SheetsPublisher};
use scrapers::HousePriceScraper;
use snapshot::{FileSnapshotStore, Slot, SnapshotStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let store = FileSnapshotStore::new(&args.data_dir);

    match args.command {
        Command::Run(run) => {
            info!("🏠 Listing Watch - houseprice.tw");
            info!("Data directory: {}", store.data_dir().display());

            let scraper = HousePriceScraper::new(run.scrape_config())?;
            let outcome = pipeline::run_once(&scraper, &store).await?;

            info!("✅ Scraped {} listings", outcome.snapshot.total_count);
            if let Some(report) = &outcome.report {
                pipeline::log_report(report, run.preview);
            }
        }
        Command::Check => {
            let status = pipeline::check(&store)?;
            if status.is_first_run {
                info!("⚠️ No snapshot yet, next run is the first");
            }
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::Publish(publish) => {
            let snapshot = store
                .load(Slot::Current)?
                .context("No current snapshot to publish, run a scrape first")?;
            info!("Found {} listings", snapshot.total_count);

            let publisher = SheetsPublisher::new(publish.sheets_config())?;
            let rows = publisher.publish(&snapshot.listings).await?;
            info!("💾 Published {} rows to {}", rows, publisher.sink_name());
        }
    }

    Ok(())
}
