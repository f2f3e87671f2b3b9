//! Forwarding listings to external sinks

pub mod sheets;

pub use sheets::{SheetsConfig, SheetsPublisher};

use crate::models::Listing;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Send the listings to the sink, returning how many rows were written
    async fn publish(&self, listings: &[Listing]) -> Result<usize>;

    fn sink_name(&self) -> &'static str;
}
