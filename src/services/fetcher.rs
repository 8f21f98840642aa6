// src/services/fetcher.rs

//! Inventory fetcher service.
//!
//! Fetches one region's cart page and extracts its raw (name, quantity)
//! item list. All page-format variance lives here; the reconciliation
//! pipeline never sees HTML.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Quantity, RawItem, Region};
use crate::utils::region_url;

/// Source of raw inventory listings for a region.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the raw item list for one region.
    ///
    /// A failure here is per-region: the caller skips the region for this
    /// run and carries its previous snapshot forward.
    async fn fetch(&self, region: &Region) -> Result<Vec<RawItem>>;
}

/// Fetcher backed by live storefront cart pages.
pub struct HtmlFetcher {
    client: Client,
    base_url: Url,
}

impl HtmlFetcher {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl Fetcher for HtmlFetcher {
    async fn fetch(&self, region: &Region) -> Result<Vec<RawItem>> {
        let url = region_url(&self.base_url, region);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::fetch(region.key(), e))?;
        let html = response
            .text()
            .await
            .map_err(|e| AppError::fetch(region.key(), e))?;

        Ok(parse_items(&html))
    }
}

/// Extract raw items from a cart page.
///
/// Current markup lists each item as a `div.card.cartitem` with the name
/// in an `<h4>` and the stock count in a `p.card-text` line. Older pages
/// lack the card wrappers, so when no cards match, bare `<h4>` headings
/// are paired with `inventory：N` lines in document order. Stock text
/// that yields no number becomes `Quantity::Unknown` rather than being
/// dropped, so the item can't masquerade as removed next run.
pub fn parse_items(html: &str) -> Vec<RawItem> {
    let items = parse_card_items(html);
    if !items.is_empty() {
        return items;
    }
    parse_legacy_items(html)
}

fn parse_card_items(html: &str) -> Vec<RawItem> {
    let card_sel = Selector::parse("div.card.cartitem").expect("static selector");
    let name_sel = Selector::parse("h4").expect("static selector");
    let stock_sel = Selector::parse("p.card-text").expect("static selector");

    let document = Html::parse_document(html);
    let mut items = Vec::new();

    for card in document.select(&card_sel) {
        let Some(name_elem) = card.select(&name_sel).next() else {
            continue;
        };
        let name = name_elem.text().collect::<String>().trim().to_string();
        if name.is_empty() {
            continue;
        }

        let quantity = card
            .select(&stock_sel)
            .next()
            .map(|elem| elem.text().collect::<String>())
            .map_or(Quantity::Unknown, |text| parse_stock_text(&text));

        items.push(RawItem::new(name, quantity));
    }

    items
}

fn parse_legacy_items(html: &str) -> Vec<RawItem> {
    let name_pattern = Regex::new(r"<h4>(.*?)</h4>").expect("static regex");
    let stock_pattern = Regex::new(r"(?i)(?:inventory|库存)\s*[:：]\s*(\d+)").expect("static regex");

    let names: Vec<String> = name_pattern
        .captures_iter(html)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str().trim();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect();

    let counts: Vec<Quantity> = stock_pattern
        .captures_iter(html)
        .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
        .map(Quantity::Known)
        .collect();

    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| RawItem::new(name, counts.get(i).copied().unwrap_or(Quantity::Unknown)))
        .collect()
}

/// Pull the stock count out of a stock line like "库存：5" or
/// "inventory: 12". First number wins; no number means unknown.
fn parse_stock_text(text: &str) -> Quantity {
    let digits = Regex::new(r"(\d+)").expect("static regex");
    digits
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .map_or(Quantity::Unknown, Quantity::Known)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD_PAGE: &str = r#"
        <html><body>
        <div class="card cartitem">
            <h4> Cloud Server 2C4G </h4>
            <p class="card-text">库存：5</p>
        </div>
        <div class="card cartitem">
            <h4>Dedicated Host</h4>
            <p class="card-text">库存：售罄</p>
        </div>
        <div class="card cartitem">
            <h4>Storage Box</h4>
        </div>
        </body></html>
    "#;

    const LEGACY_PAGE: &str = r#"
        <html><body>
        <h4>Cloud Server 2C4G</h4>
        <p>inventory：5</p>
        <h4>Dedicated Host</h4>
        <p>inventory：12</p>
        <h4>Storage Box</h4>
        </body></html>
    "#;

    #[test]
    fn test_parse_card_markup() {
        let items = parse_items(CARD_PAGE);
        assert_eq!(items.len(), 3);
        assert_eq!(
            items[0],
            RawItem::new("Cloud Server 2C4G", Quantity::Known(5))
        );
        // Non-numeric stock text degrades to unknown, item kept
        assert_eq!(items[1], RawItem::new("Dedicated Host", Quantity::Unknown));
        // Missing stock line degrades to unknown
        assert_eq!(items[2], RawItem::new("Storage Box", Quantity::Unknown));
    }

    #[test]
    fn test_parse_legacy_markup() {
        let items = parse_items(LEGACY_PAGE);
        assert_eq!(items.len(), 3);
        assert_eq!(
            items[0],
            RawItem::new("Cloud Server 2C4G", Quantity::Known(5))
        );
        assert_eq!(items[1], RawItem::new("Dedicated Host", Quantity::Known(12)));
        assert_eq!(items[2], RawItem::new("Storage Box", Quantity::Unknown));
    }

    #[test]
    fn test_parse_empty_page() {
        assert!(parse_items("<html><body></body></html>").is_empty());
    }

    #[test]
    fn test_parse_stock_text() {
        assert_eq!(parse_stock_text("库存：42"), Quantity::Known(42));
        assert_eq!(parse_stock_text("inventory: 7 units"), Quantity::Known(7));
        assert_eq!(parse_stock_text("库存：未知"), Quantity::Unknown);
        assert_eq!(parse_stock_text(""), Quantity::Unknown);
    }

    #[test]
    fn test_card_markup_preferred_over_legacy() {
        // A page with both markups parses as cards only.
        let combined = format!("{}{}", CARD_PAGE, "<h4>Ghost Item</h4>");
        let items = parse_items(&combined);
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i.name != "Ghost Item"));
    }
}
