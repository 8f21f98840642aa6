// src/models/region.rs

//! Region data structures.
//!
//! A region is one monitored (product type, optional availability zone)
//! combination. Its key is the stable identifier that snapshots are
//! persisted and diffed under; the label is presentation-only.

use serde::{Deserialize, Serialize};

/// One monitored storefront region.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Region {
    /// Product type identifier (the `fid` query value)
    pub product_id: String,

    /// Availability zone identifier (the `gid` query value), if any.
    /// `None` is the product type's default region.
    pub zone_id: Option<String>,

    /// Human-readable display name. Never used for identity.
    pub label: String,
}

impl Region {
    /// Create the default (no-zone) region for a product type.
    pub fn primary(product_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            zone_id: None,
            label: label.into(),
        }
    }

    /// Create a zoned region for a product type.
    pub fn zoned(
        product_id: impl Into<String>,
        zone_id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            zone_id: Some(zone_id.into()),
            label: label.into(),
        }
    }

    /// Stable storage/diff key for this region.
    ///
    /// Two fetches of the same real-world region always produce the same
    /// key, so diffs against persisted state are meaningful across runs.
    pub fn key(&self) -> String {
        match &self.zone_id {
            Some(zone) => format!("fid={}&gid={}", self.product_id, zone),
            None => format!("fid={}", self.product_id),
        }
    }

    /// Key of the default region for the same product type.
    pub fn default_key(&self) -> String {
        format!("fid={}", self.product_id)
    }

    /// Whether this is the first availability zone of its product type.
    ///
    /// Some storefront deployments serve the default page and `gid=1`
    /// from the same backing data; reporting treats them specially.
    pub fn is_first_zone(&self) -> bool {
        self.zone_id.as_deref() == Some("1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_stability() {
        let default = Region::primary("3", "VPS");
        let zoned = Region::zoned("3", "2", "VPS / EU");

        assert_eq!(default.key(), "fid=3");
        assert_eq!(zoned.key(), "fid=3&gid=2");
        assert_eq!(zoned.default_key(), "fid=3");
    }

    #[test]
    fn test_label_not_part_of_identity() {
        let a = Region::primary("1", "Label A");
        let b = Region::primary("1", "Label B");
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_first_zone() {
        assert!(Region::zoned("1", "1", "x").is_first_zone());
        assert!(!Region::zoned("1", "2", "x").is_first_zone());
        assert!(!Region::primary("1", "x").is_first_zone());
    }
}
