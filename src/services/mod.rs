// src/services/mod.rs

//! Service layer for the monitor application.
//!
//! This module contains the scraping and delivery collaborators:
//! - Region discovery (`RegionCatalog`, `HtmlRegionCatalog`)
//! - Inventory fetching (`Fetcher`, `HtmlFetcher`)
//! - Digest delivery (`Notifier`, `TelegramNotifier`, `ConsoleNotifier`)

mod catalog;
mod fetcher;
mod notifier;

pub use catalog::{HtmlRegionCatalog, RegionCatalog, discover_regions};
pub use fetcher::{Fetcher, HtmlFetcher};
pub use notifier::{ConsoleNotifier, Notifier, TelegramNotifier};
