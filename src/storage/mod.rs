// src/storage/mod.rs

//! State persistence for region snapshots.
//!
//! The store holds the full region-key → snapshot map as of the previous
//! successful run. It is read once at run start and fully replaced (not
//! merged) at run end; regions absent from the replacement are dropped.

pub mod local;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::Snapshot;

// Re-export for convenience
pub use local::LocalStateStore;

/// Full persisted state: region key -> last known snapshot.
pub type StateMap = BTreeMap<String, Snapshot>;

/// On-disk record wrapping the state map with write metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateData {
    /// ISO 8601 timestamp of the write
    pub updated_at: DateTime<Utc>,
    /// Number of regions in the map
    pub region_count: usize,
    /// The snapshots
    pub regions: StateMap,
}

impl StateData {
    pub fn new(regions: StateMap) -> Self {
        Self {
            updated_at: Utc::now(),
            region_count: regions.len(),
            regions,
        }
    }
}

/// Trait for state persistence backends.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the last persisted state. An empty map on fresh install,
    /// never an error.
    async fn load(&self) -> Result<StateMap>;

    /// Atomically replace the full persisted state. Either the new state
    /// is durable or the prior state remains intact.
    async fn replace(&self, regions: &StateMap) -> Result<()>;
}
