use crate::models::Listing;
use crate::publish::Publisher;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets/";

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    /// OAuth bearer token with the spreadsheets scope
    pub access_token: String,
    /// A1 range rows are appended after
    pub range: String,
}

/// Appends listings as rows to a Google spreadsheet
pub struct SheetsPublisher {
    client: Client,
    config: SheetsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    updates: Option<AppendUpdates>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_rows: Option<usize>,
}

impl SheetsPublisher {
    pub fn new(config: SheetsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    fn append_url(&self) -> Result<Url> {
        let mut url = Url::parse(SHEETS_API)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Sheets API URL cannot be a base"))?
            .pop_if_empty()
            .push(&self.config.spreadsheet_id)
            .push("values")
            .push(&format!("{}:append", self.config.range));
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        Ok(url)
    }
}

/// One sheet row per listing: id, title, price, area, url, scrapedAt
pub fn listing_rows(listings: &[Listing]) -> Vec<Vec<String>> {
    listings
        .iter()
        .map(|l| {
            vec![
                l.id.clone(),
                l.title.clone(),
                l.price.clone().unwrap_or_default(),
                l.area.clone().unwrap_or_default(),
                l.url.clone(),
                l.scraped_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            ]
        })
        .collect()
}

#[async_trait]
impl Publisher for SheetsPublisher {
    async fn publish(&self, listings: &[Listing]) -> Result<usize> {
        if listings.is_empty() {
            info!("No listings to publish");
            return Ok(0);
        }

        let url = self.append_url()?;
        debug!("Appending {} rows via {}", listings.len(), url);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.access_token)
            .json(&json!({ "values": listing_rows(listings) }))
            .send()
            .await
            .context("Failed to reach Google Sheets")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Google Sheets returned {}: {}", status, body);
        }

        let body: AppendResponse = response
            .json()
            .await
            .context("Failed to decode Google Sheets response")?;
        let rows = body
            .updates
            .and_then(|u| u.updated_rows)
            .unwrap_or(listings.len());

        info!("Updated {} rows in Google Sheet", rows);
        Ok(rows)
    }

    fn sink_name(&self) -> &'static str {
        "Google Sheets"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn publisher() -> SheetsPublisher {
        SheetsPublisher::new(SheetsConfig {
            spreadsheet_id: "sheet-123".to_string(),
            access_token: "token".to_string(),
            range: "Sheet1!A2".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_rows_fill_missing_values_with_blanks() {
        let scraped_at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut listing = Listing::new(
            "listing_1",
            "三房",
            Some("980".to_string()),
            None,
            "https://buy.houseprice.tw/house/1",
            scraped_at,
        );

        let rows = listing_rows(std::slice::from_ref(&listing));
        assert_eq!(
            rows[0],
            vec![
                "listing_1",
                "三房",
                "980",
                "",
                "https://buy.houseprice.tw/house/1",
                "2024-03-01T00:00:00+00:00"
            ]
        );

        listing.scraped_at = None;
        assert_eq!(listing_rows(&[listing])[0][5], "");
    }

    #[test]
    fn test_append_url() {
        let url = publisher().append_url().unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/Sheet1!A2:append?valueInputOption=RAW"
        );
    }

    #[tokio::test]
    async fn test_empty_publish_skips_request() {
        assert_eq!(publisher().publish(&[]).await.unwrap(), 0);
    }
}
