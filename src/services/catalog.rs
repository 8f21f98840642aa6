// src/services/catalog.rs

//! Region discovery service.
//!
//! Discovers which (product type, availability zone) regions exist on the
//! storefront by scanning cart page links, and reads human labels from the
//! product-type and zone dropdowns where the page provides them.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::Region;
use crate::utils::{http::fetch_text, region_url};

/// Catalog of pollable regions.
///
/// Both discovery calls re-derive from current upstream state; nothing is
/// memoized, so a restarted sequence reflects the live storefront.
#[async_trait]
pub trait RegionCatalog: Send + Sync {
    /// Enumerate product types as (id, label) pairs.
    async fn discover_primary(&self) -> Result<Vec<(String, String)>>;

    /// Enumerate availability zones of one product type as (id, label) pairs.
    async fn discover_secondary(&self, primary: &str) -> Result<Vec<(String, String)>>;
}

/// Compose a catalog's two discovery calls into the full region list.
///
/// Every product type yields its default (no-zone) region; product types
/// with zones yield one extra region per zone, `gid=1` included. Zone
/// enumeration failure for one product type is logged and that product
/// type keeps only its default region; only primary enumeration failure
/// is fatal.
pub async fn discover_regions(catalog: &dyn RegionCatalog) -> Result<Vec<Region>> {
    let primaries = catalog.discover_primary().await?;
    let mut regions = Vec::new();

    for (product_id, product_label) in primaries {
        regions.push(Region::primary(&product_id, &product_label));

        let zones = match catalog.discover_secondary(&product_id).await {
            Ok(zones) => zones,
            Err(e) => {
                log::warn!("Zone discovery failed for fid={}: {}", product_id, e);
                continue;
            }
        };

        for (zone_id, zone_label) in zones {
            let label = format!("{} / {}", product_label, zone_label);
            regions.push(Region::zoned(&product_id, &zone_id, label));
        }
    }

    Ok(regions)
}

/// Region catalog backed by live storefront pages.
pub struct HtmlRegionCatalog {
    client: Client,
    base_url: Url,
}

impl HtmlRegionCatalog {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    async fn fetch_cart_page(&self, region: &Region) -> Result<String> {
        let url = region_url(&self.base_url, region);
        fetch_text(&self.client, url).await
    }
}

#[async_trait]
impl RegionCatalog for HtmlRegionCatalog {
    async fn discover_primary(&self) -> Result<Vec<(String, String)>> {
        // Any cart page links to every product type; fid=1 always exists.
        let probe = Region::primary("1", "");
        let html = self
            .fetch_cart_page(&probe)
            .await
            .map_err(|e| AppError::discovery(format!("cart page fetch failed: {e}")))?;

        let ids = extract_primary_ids(&html);
        let labels = extract_select_labels(&html, "productType");

        Ok(ids
            .into_iter()
            .map(|id| {
                let label = labels
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| format!("fid={}", id));
                (id, label)
            })
            .collect())
    }

    async fn discover_secondary(&self, primary: &str) -> Result<Vec<(String, String)>> {
        let probe = Region::primary(primary, "");
        let html = self.fetch_cart_page(&probe).await?;

        let ids = extract_secondary_ids(&html, primary);
        let labels = extract_select_labels(&html, "availabilityZone");

        Ok(ids
            .into_iter()
            .map(|id| {
                let label = labels
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| format!("gid={}", id));
                (id, label)
            })
            .collect())
    }
}

/// Scan a cart page for product type ids linked anywhere on it.
///
/// fid=1 is always included: the storefront serves it even when no page
/// links back to it. Returned in ascending numeric order.
pub fn extract_primary_ids(html: &str) -> Vec<String> {
    let pattern = Regex::new(r"/cart\?fid=(\d+)").expect("static regex");

    let mut ids: BTreeSet<u64> = pattern
        .captures_iter(html)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .collect();
    ids.insert(1);

    ids.into_iter().map(|id| id.to_string()).collect()
}

/// Scan a product type's cart page for its zone ids, ascending.
pub fn extract_secondary_ids(html: &str, primary: &str) -> Vec<String> {
    // `&` may appear entity-encoded in page markup.
    let pattern = Regex::new(&format!(
        r"cart\?fid={}&(?:amp;)?gid=(\d+)",
        regex::escape(primary)
    ))
    .expect("escaped primary id");

    let ids: BTreeSet<u64> = pattern
        .captures_iter(html)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .collect();

    ids.into_iter().map(|id| id.to_string()).collect()
}

/// Read (value, text) pairs from a `<select>` element's options.
pub fn extract_select_labels(html: &str, select_id: &str) -> HashMap<String, String> {
    let mut labels = HashMap::new();

    let Ok(selector) = Selector::parse(&format!("select#{} option", select_id)) else {
        return labels;
    };

    let document = Html::parse_document(html);
    for option in document.select(&selector) {
        let Some(value) = option.value().attr("value") else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let text = option.text().collect::<String>().trim().to_string();
        if !text.is_empty() {
            labels.insert(value.to_string(), text);
        }
    }

    labels
}
