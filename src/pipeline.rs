use crate::changes::detect_changes;
use crate::models::{ChangeReport, Snapshot};
use crate::scrapers::ScraperTrait;
use crate::snapshot::{Slot, SnapshotStore};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Result of one scrape-and-compare run
#[derive(Debug)]
pub struct RunOutcome {
    pub snapshot: Snapshot,
    /// `None` on the first run, when there was nothing to compare against
    pub report: Option<ChangeReport>,
}

/// Scrape, compare against the previous run, persist, and rotate
///
/// The previous snapshot is read before anything is written, so a corrupt
/// baseline aborts the run with both slots untouched.
pub async fn run_once(scraper: &dyn ScraperTrait, store: &dyn SnapshotStore) -> Result<RunOutcome> {
    info!("Scraping {}", scraper.source_name());
    let listings = scraper
        .scrape()
        .await
        .with_context(|| format!("Scrape of {} failed", scraper.source_name()))?;

    let previous = store
        .load_baseline()
        .context("Failed to load previous snapshot")?;

    let snapshot = Snapshot::new(listings);
    let report = previous.map(|prev| detect_changes(&snapshot.listings, &prev.listings));

    store
        .save(Slot::Current, &snapshot)
        .context("Failed to save current snapshot")?;
    info!("Saved current snapshot with {} listings", snapshot.total_count);

    match &report {
        Some(report) => store
            .save_report(report)
            .context("Failed to save change report")?,
        None => info!("First run, nothing to compare against"),
    }

    store.rotate().context("Failed to rotate snapshots")?;
    info!("Current snapshot is now the baseline for the next run");

    Ok(RunOutcome { snapshot, report })
}

/// Log the headline numbers and the first `preview` new listings
pub fn log_report(report: &ChangeReport, preview: usize) {
    if !report.has_changes() {
        info!("No changes since the last run");
        return;
    }

    info!("=== {} changes ===", report.total_changes());
    info!("New listings: {}", report.new_count);
    info!("Removed listings: {}", report.deleted_count);
    info!("Price changes: {}", report.price_change_count);

    for listing in report.new_listings.iter().take(preview) {
        info!(
            "  + {} | {}",
            listing.title,
            listing.price.as_deref().unwrap_or("N/A")
        );
    }
    for change in report.price_changes.iter().take(preview) {
        info!(
            "  ~ {} | {} -> {}",
            change.title,
            change.old_price.as_deref().unwrap_or("N/A"),
            change.new_price.as_deref().unwrap_or("N/A")
        );
    }
}

/// State of the current slot, reported by `check`
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckStatus {
    pub is_first_run: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
}

pub fn check(store: &dyn SnapshotStore) -> Result<CheckStatus> {
    let current = store
        .load(Slot::Current)
        .context("Failed to load current snapshot")?;

    Ok(CheckStatus {
        is_first_run: current.is_none(),
        timestamp: Utc::now(),
        previous_timestamp: current.as_ref().map(|s| s.timestamp),
        total_count: current.as_ref().map(|s| s.total_count),
    })
}
