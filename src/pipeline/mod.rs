// src/pipeline/mod.rs

//! Pipeline entry points for monitor operations.
//!
//! - `reconcile`: Diff a region's fresh snapshot against its persisted one
//! - `run_monitor`: One full discover → fetch → reconcile → notify pass

pub mod monitor;
pub mod reconcile;

pub use monitor::{MonitorOutcome, run_monitor};
pub use reconcile::reconcile;
