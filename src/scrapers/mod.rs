pub mod houseprice;
pub mod identity;
pub mod traits;
pub mod types;

pub use houseprice::HousePriceScraper;
pub use traits::ScraperTrait;
