use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Longest title kept on a listing, in characters
pub const MAX_TITLE_CHARS: usize = 100;

/// One scraped property listing
///
/// `id` is the join key between runs. Missing fields in persisted data fall
/// back to defaults instead of failing the whole snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Asking price in 萬, digits only
    #[serde(
        default,
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<String>,
    /// Floor area in 坪
    #[serde(
        default,
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub area: Option<String>,
    /// Older scraper variants wrote this field as `link`
    #[serde(default, alias = "link")]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<DateTime<Utc>>,
}

impl Listing {
    /// Build a listing, truncating the title to [`MAX_TITLE_CHARS`]
    pub fn new(
        id: impl Into<String>,
        title: &str,
        price: Option<String>,
        area: Option<String>,
        url: impl Into<String>,
        scraped_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: truncate_title(title),
            price,
            area,
            url: url.into(),
            scraped_at: Some(scraped_at),
        }
    }
}

fn truncate_title(title: &str) -> String {
    title.trim().chars().take(MAX_TITLE_CHARS).collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

/// Some scraper variants stored price and area as JSON numbers
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<TextOrNumber>::deserialize(deserializer)?.map(|value| match value {
            TextOrNumber::Text(text) => text,
            TextOrNumber::Number(number) => number.to_string(),
        }),
    )
}

/// All listings captured by one run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub total_count: usize,
    #[serde(default)]
    pub listings: Vec<Listing>,
}

impl Snapshot {
    /// Snapshot of `listings` stamped with the current time
    pub fn new(listings: Vec<Listing>) -> Self {
        Self::at(Utc::now(), listings)
    }

    pub fn at(timestamp: DateTime<Utc>, listings: Vec<Listing>) -> Self {
        Self {
            timestamp,
            total_count: listings.len(),
            listings,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.total_count == self.listings.len()
    }
}

/// A listing whose price moved between two runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PriceChange {
    pub id: String,
    pub title: String,
    pub old_price: Option<String>,
    pub new_price: Option<String>,
}

/// Difference between the current and previous snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeReport {
    pub new_count: usize,
    pub deleted_count: usize,
    pub price_change_count: usize,
    pub new_listings: Vec<Listing>,
    pub deleted_listings: Vec<Listing>,
    pub price_changes: Vec<PriceChange>,
}

impl ChangeReport {
    /// Build a report, deriving the counts from the sequences
    pub fn new(
        new_listings: Vec<Listing>,
        deleted_listings: Vec<Listing>,
        price_changes: Vec<PriceChange>,
    ) -> Self {
        Self {
            new_count: new_listings.len(),
            deleted_count: deleted_listings.len(),
            price_change_count: price_changes.len(),
            new_listings,
            deleted_listings,
            price_changes,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_changes(&self) -> bool {
        !self.new_listings.is_empty()
            || !self.deleted_listings.is_empty()
            || !self.price_changes.is_empty()
    }

    pub fn total_changes(&self) -> usize {
        self.new_count + self.deleted_count + self.price_change_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_is_truncated_by_characters() {
        let title = "桃".repeat(150);
        let listing = Listing::new("a", &title, None, None, "https://x", Utc::now());
        assert_eq!(listing.title.chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_link_field_is_read_as_url() {
        let json = r#"{"id":"a","title":"t","price":"800","area":"30","link":"https://buy.houseprice.tw/house/1","scrapedAt":"2024-01-01T00:00:00Z"}"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.url, "https://buy.houseprice.tw/house/1");

        let written = serde_json::to_value(&listing).unwrap();
        assert!(written.get("link").is_none());
        assert_eq!(written["url"], "https://buy.houseprice.tw/house/1");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let listing: Listing = serde_json::from_str(r#"{"title":"only a title"}"#).unwrap();
        assert_eq!(listing.id, "");
        assert_eq!(listing.price, None);
        assert_eq!(listing.scraped_at, None);
    }

    #[test]
    fn test_numeric_price_and_area_are_kept_as_text() {
        let listing: Listing =
            serde_json::from_str(r#"{"id":"a","price":800,"area":32.5,"url":"https://x"}"#).unwrap();
        assert_eq!(listing.price.as_deref(), Some("800"));
        assert_eq!(listing.area.as_deref(), Some("32.5"));

        let nulls: Listing = serde_json::from_str(r#"{"id":"a","price":null}"#).unwrap();
        assert_eq!(nulls.price, None);
    }

    #[test]
    fn test_snapshot_counts_listings() {
        let snapshot = Snapshot::new(vec![Listing::default(), Listing::default()]);
        assert_eq!(snapshot.total_count, 2);
        assert!(snapshot.is_consistent());

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["totalCount"], 2);
    }

    #[test]
    fn test_report_counts_follow_sequences() {
        let report = ChangeReport::new(vec![Listing::default()], vec![], vec![]);
        assert_eq!(report.new_count, 1);
        assert_eq!(report.total_changes(), 1);
        assert!(report.has_changes());
        assert!(!ChangeReport::empty().has_changes());
    }
}
