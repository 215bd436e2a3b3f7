//! Service layer for the sync engine.
//!
//! This module contains the extraction logic for:
//! - Feed parsing (`parse_feed`)
//! - Selector extraction (`extract_by_selector`)
//! - HTTP fetching for both strategies (`HttpFetcher`)

pub mod feed;
mod fetcher;
pub mod selector;

pub use feed::parse_feed;
pub use fetcher::{ContentFetcher, HttpFetcher};
pub use selector::extract_by_selector;
