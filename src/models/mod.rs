// src/models/mod.rs

//! Domain models for the sync engine.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod item;
pub mod property;
mod record;

// Re-export all public types
pub use config::{Config, FetchConfig, FieldNames, RetryConfig, StoreConfig, SyncConfig};
pub use item::{FetchedItem, RunOutcome};
pub use property::PropertyValue;
pub use record::{FetchPlan, PageTarget, RawRecord, RecordStatus, RecordUpdate, SourceRecord};
