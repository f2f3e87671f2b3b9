use crate::models::Listing;
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for all listing scrapers
/// Change detection only sees the listings, so sources can be swapped freely
#[async_trait]
pub trait ScraperTrait: Send + Sync {
    /// Scrape the current listings from the source
    async fn scrape(&self) -> Result<Vec<Listing>>;

    /// Get the name of the scraper source
    fn source_name(&self) -> &'static str;
}
