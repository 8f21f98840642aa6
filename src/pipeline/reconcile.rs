// src/pipeline/reconcile.rs

//! Snapshot reconciliation.
//!
//! Compares a region's fresh snapshot against its last persisted one and
//! produces the minimal set of change events. Pure function: previous
//! state comes in as an argument and never from process-wide storage, so
//! every case is testable without I/O.

use crate::models::{ChangeEvent, Snapshot};

/// Diff two snapshots of the same region.
///
/// With no previous snapshot (first time this region has ever been
/// observed) a single `NewRegion` event carries the full snapshot and no
/// per-item events are emitted. Otherwise added and changed items are
/// reported in current-snapshot name order, then removed items in
/// previous-snapshot name order. Identical snapshots produce nothing.
pub fn reconcile(
    region: &str,
    previous: Option<&Snapshot>,
    current: &Snapshot,
) -> Vec<ChangeEvent> {
    let Some(previous) = previous else {
        return vec![ChangeEvent::NewRegion {
            region: region.to_string(),
            snapshot: current.clone(),
        }];
    };

    let mut events = Vec::new();

    for (name, quantity) in current.iter() {
        match previous.get(name) {
            None => events.push(ChangeEvent::ItemAdded {
                region: region.to_string(),
                name: name.to_string(),
                quantity,
            }),
            Some(old) if old != quantity => events.push(ChangeEvent::QuantityChanged {
                region: region.to_string(),
                name: name.to_string(),
                old,
                new: quantity,
            }),
            Some(_) => {}
        }
    }

    for (name, _) in previous.iter() {
        if !current.contains(name) {
            events.push(ChangeEvent::ItemRemoved {
                region: region.to_string(),
                name: name.to_string(),
            });
        }
    }

    events
}
