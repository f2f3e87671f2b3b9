use tracing::warn;
use url::Url;

/// Derives the stable listing id from its detail-page URL
///
/// Ids must not depend on listing content, so the same property keeps its id
/// when title or price change between runs.
pub trait IdStrategy: Send + Sync {
    fn derive_id(&self, url: &Url) -> String;
}

/// Ids for houseprice.tw detail pages: `/house/<id>/...` becomes `listing_<id>`
#[derive(Debug, Default, Clone)]
pub struct HouseIdStrategy;

impl IdStrategy for HouseIdStrategy {
    fn derive_id(&self, url: &Url) -> String {
        let house_id = url.path_segments().and_then(|mut segments| {
            segments.find(|s| *s == "house")?;
            segments.next().filter(|s| !s.is_empty())
        });

        match house_id {
            Some(id) => format!("listing_{}", id),
            None => {
                let fallback = canonical_path_id(url);
                warn!("Unrecognised listing URL {}, using id {}", url, fallback);
                fallback
            }
        }
    }
}

/// Host and path without query, fragment or trailing slash
pub fn canonical_path_id(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    let path = url.path().trim_end_matches('/');
    format!("path:{}{}", host, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_of(raw: &str) -> String {
        HouseIdStrategy.derive_id(&Url::parse(raw).unwrap())
    }

    #[test]
    fn test_house_segment_becomes_id() {
        assert_eq!(id_of("https://buy.houseprice.tw/house/1234567"), "listing_1234567");
        assert_eq!(
            id_of("https://buy.houseprice.tw/house/1234567/some-title?utm=x#top"),
            "listing_1234567"
        );
    }

    #[test]
    fn test_id_ignores_query_string() {
        assert_eq!(
            id_of("https://buy.houseprice.tw/house/99?ref=list"),
            id_of("https://buy.houseprice.tw/house/99")
        );
    }

    #[test]
    fn test_unrecognised_url_falls_back_to_path() {
        assert_eq!(
            id_of("https://Buy.HousePrice.tw/community/abc/?p=2"),
            "path:buy.houseprice.tw/community/abc"
        );
        assert_eq!(id_of("https://buy.houseprice.tw/house/"), "path:buy.houseprice.tw/house");
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let raw = "https://example.com/listing/42";
        assert_eq!(id_of(raw), id_of(raw));
    }
}
