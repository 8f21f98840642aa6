// src/models/mod.rs

//! Domain models for the monitor application.

mod config;
mod event;
mod region;
mod snapshot;

// Re-export all public types
pub use config::{Config, MonitorConfig, ScraperConfig, StorefrontConfig, TelegramConfig};
pub use event::{ChangeEvent, Digest, DigestSection, chunk_message};
pub use region::Region;
pub use snapshot::{Quantity, RawItem, Snapshot};
