// src/lib.rs

//! stockwatch Library
//!
//! Discovers storefront inventory regions, reconciles fresh snapshots
//! against persisted state, and reports stock changes.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
