// src/utils/mod.rs

//! Utility functions and helpers.

pub mod http;

use url::Url;

use crate::models::Region;

/// Build the cart page URL for a region.
pub fn region_url(base: &Url, region: &Region) -> Url {
    let mut url = base.clone();
    url.set_path("cart");
    url.set_query(None);
    url.query_pairs_mut().append_pair("fid", &region.product_id);
    if let Some(zone) = &region.zone_id {
        url.query_pairs_mut().append_pair("gid", zone);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_url_default() {
        let base = Url::parse("https://cloud.example.com").unwrap();
        let region = Region::primary("3", "VPS");
        assert_eq!(
            region_url(&base, &region).as_str(),
            "https://cloud.example.com/cart?fid=3"
        );
    }

    #[test]
    fn test_region_url_zoned() {
        let base = Url::parse("https://cloud.example.com").unwrap();
        let region = Region::zoned("3", "2", "VPS / EU");
        assert_eq!(
            region_url(&base, &region).as_str(),
            "https://cloud.example.com/cart?fid=3&gid=2"
        );
    }

    #[test]
    fn test_region_url_replaces_base_path_and_query() {
        let base = Url::parse("https://cloud.example.com/somewhere?x=1").unwrap();
        let region = Region::primary("1", "x");
        assert_eq!(
            region_url(&base, &region).as_str(),
            "https://cloud.example.com/cart?fid=1"
        );
    }
}
