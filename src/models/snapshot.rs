// src/models/snapshot.rs

//! Inventory snapshot data structures and the snapshot builder.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stock quantity for one item.
///
/// `Unknown` is a distinct state from zero: an item whose stock text the
/// page parser could not read stays listed, it just has no usable count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<u64>", into = "Option<u64>")]
pub enum Quantity {
    Known(u64),
    Unknown,
}

impl Quantity {
    /// Parse a scraped stock string. Anything non-numeric degrades to
    /// `Unknown` rather than dropping the item.
    pub fn parse(raw: &str) -> Self {
        raw.trim()
            .parse::<u64>()
            .map_or(Quantity::Unknown, Quantity::Known)
    }
}

impl From<Option<u64>> for Quantity {
    fn from(value: Option<u64>) -> Self {
        value.map_or(Quantity::Unknown, Quantity::Known)
    }
}

impl From<Quantity> for Option<u64> {
    fn from(value: Quantity) -> Self {
        match value {
            Quantity::Known(n) => Some(n),
            Quantity::Unknown => None,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Known(n) => write!(f, "{}", n),
            Quantity::Unknown => write!(f, "unknown"),
        }
    }
}

/// A single (name, quantity) pair as scraped from a region page,
/// before deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub name: String,
    pub quantity: Quantity,
}

impl RawItem {
    pub fn new(name: impl Into<String>, quantity: Quantity) -> Self {
        Self {
            name: name.into(),
            quantity,
        }
    }
}

/// Canonical inventory snapshot for one region: item name -> quantity.
///
/// Backed by a sorted map so iteration order is deterministic run-to-run
/// regardless of fetch order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    items: BTreeMap<String, Quantity>,
}

impl Snapshot {
    /// Build a snapshot from raw scraped items.
    ///
    /// Later duplicates of the same name overwrite earlier ones; page
    /// parsers are expected to deduplicate already, but the builder must
    /// not fail when they don't. Items with empty names are skipped.
    pub fn build(raw_items: impl IntoIterator<Item = RawItem>) -> Self {
        let mut items = BTreeMap::new();
        for item in raw_items {
            let name = item.name.trim();
            if name.is_empty() {
                continue;
            }
            items.insert(name.to_string(), item.quantity);
        }
        Self { items }
    }

    pub fn get(&self, name: &str) -> Option<Quantity> {
        self.items.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate items in sorted name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Quantity)> {
        self.items.iter().map(|(name, qty)| (name.as_str(), *qty))
    }
}

impl FromIterator<(String, Quantity)> for Snapshot {
    fn from_iter<T: IntoIterator<Item = (String, Quantity)>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
