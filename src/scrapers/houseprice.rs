use crate::models::Listing;
use crate::scrapers::identity::{HouseIdStrategy, IdStrategy};
use crate::scrapers::traits::ScraperTrait;
use crate::scrapers::types::ScrapeConfig;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use url::Url;

/// Extracts listing cards from a houseprice.tw search page
pub struct ListingParser {
    anchor: Selector,
    title: Selector,
    site_url: Url,
    ids: Box<dyn IdStrategy>,
}

impl ListingParser {
    pub fn new(site_url: Url, ids: Box<dyn IdStrategy>) -> Result<Self> {
        Ok(Self {
            anchor: parse_selector(r#"a[href*="/house/"]"#)?,
            title: parse_selector("h2, h3, .title")?,
            site_url,
            ids,
        })
    }

    /// Parse every listing card on the page
    ///
    /// Cards without a title or with an unusable link are skipped.
    pub fn parse(&self, html: &str, scraped_at: DateTime<Utc>) -> Vec<Listing> {
        let document = Html::parse_document(html);

        document
            .select(&self.anchor)
            .filter_map(|card| self.parse_card(card, scraped_at))
            .collect()
    }

    fn parse_card(&self, card: ElementRef<'_>, scraped_at: DateTime<Utc>) -> Option<Listing> {
        let href = card.value().attr("href")?;

        let title: String = card
            .select(&self.title)
            .flat_map(|el| el.text())
            .collect();
        let title = title.trim();
        if title.is_empty() {
            debug!("Skipping card without title: {}", href);
            return None;
        }

        let url = match self.site_url.join(href) {
            Ok(url) => url,
            Err(e) => {
                warn!("Skipping card with bad link {}: {}", href, e);
                return None;
            }
        };

        let text: String = card.text().collect();

        Some(Listing::new(
            self.ids.derive_id(&url),
            title,
            extract_price(&text),
            extract_area(&text),
            url.as_str(),
            scraped_at,
        ))
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector {}: {:?}", css, e))
}

/// First `<digits> 萬` amount in the text, with thousands separators removed
pub fn extract_price(text: &str) -> Option<String> {
    text.match_indices('萬').find_map(|(pos, _)| {
        let before = text[..pos].trim_end();
        let amount = trailing_run(before, |c| c.is_ascii_digit() || c == ',');
        let digits: String = amount
            .trim_start_matches(',')
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        (!digits.is_empty()).then_some(digits)
    })
}

/// First `<number>坪` figure in the text
pub fn extract_area(text: &str) -> Option<String> {
    text.match_indices('坪').find_map(|(pos, _)| {
        let figure = trailing_run(&text[..pos], |c| c.is_ascii_digit() || c == '.');
        figure
            .chars()
            .any(|c| c.is_ascii_digit())
            .then(|| figure.to_string())
    })
}

/// Longest suffix of `s` whose characters all satisfy `keep`
fn trailing_run(s: &str, keep: impl Fn(char) -> bool) -> &str {
    let start = s
        .char_indices()
        .rev()
        .take_while(|(_, c)| keep(*c))
        .last()
        .map_or(s.len(), |(i, _)| i);
    &s[start..]
}

/// Scraper for houseprice.tw search results
pub struct HousePriceScraper {
    client: Client,
    config: ScrapeConfig,
    parser: ListingParser,
}

impl HousePriceScraper {
    /// Create a scraper using the default houseprice.tw id rules
    pub fn new(config: ScrapeConfig) -> Result<Self> {
        Self::with_id_strategy(config, Box::new(HouseIdStrategy))
    }

    /// Create a scraper with custom id derivation
    pub fn with_id_strategy(config: ScrapeConfig, ids: Box<dyn IdStrategy>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        let site_url = Url::parse(&config.site_url)
            .with_context(|| format!("Invalid site URL: {}", config.site_url))?;
        let parser = ListingParser::new(site_url, ids)?;

        Ok(Self {
            client,
            config,
            parser,
        })
    }

    /// Download one search results page
    pub async fn fetch_page(&self, page: u32) -> Result<String> {
        let url = self.config.page_url(page);
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch page {}", page))?;

        if !response.status().is_success() {
            anyhow::bail!("Page {} returned status: {}", page, response.status());
        }

        let html = response.text().await.context("Failed to read response body")?;
        debug!("Downloaded {} bytes of HTML", html.len());

        Ok(html)
    }

    /// Fetch and parse one page
    ///
    /// A failed first page is an error so an outage never looks like every
    /// listing was removed. Later failed pages count as empty.
    async fn scrape_page(&self, page: u32) -> Result<Vec<Listing>> {
        match self.fetch_page(page).await {
            Ok(html) => Ok(self.parser.parse(&html, Utc::now())),
            Err(e) if page == 1 => Err(e.context("First results page is unavailable")),
            Err(e) => {
                warn!("Page {} failed: {:#}", page, e);
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait]
impl ScraperTrait for HousePriceScraper {
    async fn scrape(&self) -> Result<Vec<Listing>> {
        info!("Scraping up to {} pages", self.config.max_pages);

        let mut listings = Vec::new();
        let mut seen = HashSet::new();

        for page in 1..=self.config.max_pages {
            let page_listings = self.scrape_page(page).await?;

            if page_listings.is_empty() {
                info!("Page {} has no listings, stopping", page);
                break;
            }

            info!("Page {}: {} listings", page, page_listings.len());
            for listing in page_listings {
                if seen.insert(listing.id.clone()) {
                    listings.push(listing);
                } else {
                    debug!("Duplicate listing {} on page {}", listing.id, page);
                }
            }

            if page < self.config.max_pages {
                tokio::time::sleep(self.config.page_delay).await;
            }
        }

        info!("Scraped {} listings in total", listings.len());
        Ok(listings)
    }

    fn source_name(&self) -> &'static str {
        "houseprice.tw"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="list">
            <a href="/house/1001/zhongli">
              <h3>中壢區 近中原大學 三房平車</h3>
              <span>1,280 萬</span><span>32.5坪</span>
            </a>
            <a href="https://buy.houseprice.tw/house/1002">
              <div class="title">桃園區 捷運宅</div>
              <span>總價 998萬</span><span>28坪</span>
            </a>
            <a href="/house/1003"><span>no title here 500萬</span></a>
            <a href="/community/77"><h3>Not a listing</h3></a>
            <a href="/house/1004"><h2>大園區 透天</h2><span>價格洽詢</span></a>
          </div>
        </body></html>
    "#;

    fn parser() -> ListingParser {
        ListingParser::new(
            Url::parse("https://buy.houseprice.tw").unwrap(),
            Box::new(HouseIdStrategy),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_listing_cards() {
        let listings = parser().parse(PAGE, Utc::now());

        assert_eq!(listings.len(), 3);

        let first = &listings[0];
        assert_eq!(first.id, "listing_1001");
        assert_eq!(first.title, "中壢區 近中原大學 三房平車");
        assert_eq!(first.price.as_deref(), Some("1280"));
        assert_eq!(first.area.as_deref(), Some("32.5"));
        assert_eq!(first.url, "https://buy.houseprice.tw/house/1001/zhongli");

        let second = &listings[1];
        assert_eq!(second.id, "listing_1002");
        assert_eq!(second.title, "桃園區 捷運宅");
        assert_eq!(second.price.as_deref(), Some("998"));
        assert_eq!(second.area.as_deref(), Some("28"));
    }

    #[test]
    fn test_card_without_price() {
        let listings = parser().parse(PAGE, Utc::now());

        let last = &listings[2];
        assert_eq!(last.id, "listing_1004");
        assert_eq!(last.price, None);
        assert_eq!(last.area, None);
    }

    #[test]
    fn test_extract_price() {
        assert_eq!(extract_price("總價 1,280 萬元").as_deref(), Some("1280"));
        assert_eq!(extract_price("總價 12,345萬").as_deref(), Some("12345"));
        assert_eq!(extract_price("萬 first, then 1500萬").as_deref(), Some("1500"));
        assert_eq!(extract_price("價格洽詢"), None);
    }

    #[test]
    fn test_extract_area() {
        assert_eq!(extract_area("建坪 45.67坪 3房").as_deref(), Some("45.67"));
        assert_eq!(extract_area("坪數未提供"), None);
    }

    #[tokio::test]
    async fn test_unreachable_first_page_is_an_error() {
        let config = ScrapeConfig {
            search_url: "http://127.0.0.1:1/list/?p=".to_string(),
            max_pages: 2,
            page_delay: std::time::Duration::ZERO,
            timeout: std::time::Duration::from_secs(2),
            ..ScrapeConfig::default()
        };
        let scraper = HousePriceScraper::new(config).unwrap();

        let err = scraper.scrape().await.unwrap_err();

        assert!(format!("{:#}", err).contains("First results page is unavailable"));
    }

    #[test]
    fn test_page_url() {
        let config = ScrapeConfig {
            search_url: "https://example.com/list/?p=".to_string(),
            ..ScrapeConfig::default()
        };
        assert_eq!(config.page_url(3), "https://example.com/list/?p=3");
    }
}
