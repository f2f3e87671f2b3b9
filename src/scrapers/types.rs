use std::time::Duration;

pub const DEFAULT_SITE_URL: &str = "https://buy.houseprice.tw";

/// Taoyuan search: 中壢/大園/桃園, elevator buildings, 2+ rooms, under 1200萬, newest first
pub const DEFAULT_SEARCH_URL: &str = "https://buy.houseprice.tw/list/%E6%A1%83%E5%9C%92%E5%B8%82_city/%E4%B8%AD%E5%A3%A2%E5%8D%80-%E5%A4%A7%E5%9C%92%E5%8D%80-%E6%A1%83%E5%9C%92%E5%8D%80_zip/%E4%BD%8F%E5%AE%85_use/%E9%9B%BB%E6%A2%AF%E5%A4%A7%E6%A8%93_type/2-_room/5-_floor/-1200_price/20-_age/nearmrt_filter/publish-desc_sort/?p=";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Settings for one scrape run
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Search URL; the page number is appended to it
    pub search_url: String,
    /// Origin used to resolve relative listing links
    pub site_url: String,
    /// Upper bound on pages fetched
    pub max_pages: u32,
    /// Pause between two page requests
    pub page_delay: Duration,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            max_pages: 13,
            page_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ScrapeConfig {
    pub fn page_url(&self, page: u32) -> String {
        format!("{}{}", self.search_url, page)
    }
}
