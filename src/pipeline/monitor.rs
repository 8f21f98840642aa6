// src/pipeline/monitor.rs

//! Monitor run orchestration.
//!
//! One pass: discover regions, fetch each region's inventory, reconcile
//! against the persisted state, replace the state, deliver the digest.
//! Fetching runs with bounded concurrency; reconciliation and the single
//! state replace stay sequential, so the store only ever sees one writer
//! per run and each comparison works on an immutable previous snapshot.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::error::Result;
use crate::models::{ChangeEvent, Config, Digest, DigestSection, Region, Snapshot};
use crate::pipeline::reconcile;
use crate::services::{Fetcher, Notifier, RegionCatalog, discover_regions};
use crate::storage::{StateMap, StateStore};

/// Summary of one monitor pass.
#[derive(Debug, Default)]
pub struct MonitorOutcome {
    pub regions_discovered: usize,
    pub fetch_failures: usize,
    pub suppressed_regions: usize,
    pub digest: Digest,
}

impl MonitorOutcome {
    pub fn event_count(&self) -> usize {
        self.digest.event_count()
    }
}

/// Run one monitor pass.
///
/// Failure semantics follow the error taxonomy: primary discovery
/// failure aborts the run with the store untouched; a region's fetch
/// failure skips that region and carries its previous snapshot forward;
/// notifier failure is logged after the state is already replaced.
pub async fn run_monitor(
    config: &Config,
    catalog: &dyn RegionCatalog,
    fetcher: &dyn Fetcher,
    store: &dyn StateStore,
    notifier: &dyn Notifier,
) -> Result<MonitorOutcome> {
    let regions = discover_regions(catalog).await?;
    if regions.is_empty() {
        log::warn!("No regions discovered, nothing to monitor");
        return Ok(MonitorOutcome::default());
    }
    log::info!("Discovered {} regions", regions.len());

    let previous = store.load().await?;

    let (snapshots, fetch_failures) = fetch_snapshots(config, fetcher, &regions).await;

    // Reconcile in discovery order; region keys derive from numerically
    // sorted ids, so the order is deterministic run-to-run.
    let mut new_state = StateMap::new();
    let mut events_by_region: BTreeMap<String, Vec<ChangeEvent>> = BTreeMap::new();

    for region in &regions {
        let key = region.key();
        match snapshots.get(&key) {
            Some(current) => {
                let events = reconcile(&key, previous.get(&key), current);
                new_state.insert(key.clone(), current.clone());
                events_by_region.insert(key, events);
            }
            None => {
                // Fetch failed: carry the prior snapshot forward so a
                // transient scrape failure never reads as a removal.
                if let Some(prior) = previous.get(&key) {
                    new_state.insert(key.clone(), prior.clone());
                    log::info!("Carrying forward prior snapshot for {}", key);
                }
            }
        }
    }

    for dropped in previous.keys().filter(|k| !new_state.contains_key(*k)) {
        log::debug!("Region {} no longer discovered, dropping from state", dropped);
    }

    let suppressed = if config.monitor.suppress_mirrored_zone {
        mirrored_zone_keys(&regions, &snapshots)
    } else {
        HashSet::new()
    };
    for key in &suppressed {
        log::debug!("Suppressing digest for {} (mirrors default region)", key);
    }

    let mut digest = Digest::default();
    for region in &regions {
        let key = region.key();
        if suppressed.contains(&key) {
            continue;
        }
        if let Some(events) = events_by_region.get(&key) {
            if !events.is_empty() {
                digest.sections.push(DigestSection {
                    label: region.label.clone(),
                    events: events.clone(),
                });
            }
        }
    }

    store.replace(&new_state).await?;

    if digest.is_empty() {
        log::info!("No inventory changes this run");
    } else {
        log::info!(
            "{} changes across {} regions",
            digest.event_count(),
            digest.sections.len()
        );
        if let Err(e) = notifier.send(&digest).await {
            log::error!("Digest delivery failed: {}", e);
        }
    }

    Ok(MonitorOutcome {
        regions_discovered: regions.len(),
        fetch_failures,
        suppressed_regions: suppressed.len(),
        digest,
    })
}

/// Fetch all regions with bounded concurrency, building snapshots as
/// results arrive. Failed regions are logged and left out of the map.
async fn fetch_snapshots(
    config: &Config,
    fetcher: &dyn Fetcher,
    regions: &[Region],
) -> (BTreeMap<String, Snapshot>, usize) {
    let concurrency = config.scraper.max_concurrent.max(1);
    let delay = Duration::from_millis(config.scraper.request_delay_ms);

    let mut snapshots = BTreeMap::new();
    let mut failures = 0;

    let mut fetch_stream = stream::iter(regions.iter())
        .map(|region| async move { (region, fetcher.fetch(region).await) })
        .buffer_unordered(concurrency);

    while let Some((region, result)) = fetch_stream.next().await {
        match result {
            Ok(raw_items) => {
                snapshots.insert(region.key(), Snapshot::build(raw_items));
            }
            Err(error) => {
                failures += 1;
                log::warn!("Fetch failed for {} ({}): {}", region.key(), region.label, error);
            }
        }

        if delay.as_millis() > 0 {
            tokio::time::sleep(delay).await;
        }
    }

    (snapshots, failures)
}

/// Keys of `gid=1` regions whose snapshot equals their product type's
/// default region snapshot this run. Those regions stay discovered and
/// persisted; only their reporting is withheld to avoid double digests
/// when the storefront serves both pages from the same backing data.
fn mirrored_zone_keys(
    regions: &[Region],
    snapshots: &BTreeMap<String, Snapshot>,
) -> HashSet<String> {
    regions
        .iter()
        .filter(|r| r.is_first_zone())
        .filter_map(|region| {
            let key = region.key();
            let zone_snapshot = snapshots.get(&key)?;
            let default_snapshot = snapshots.get(&region.default_key())?;
            (zone_snapshot == default_snapshot).then_some(key)
        })
        .collect()
}
