// src/config.rs

//! Configuration loading and run wiring.
//!
//! This module loads configuration from the storage directory and builds the
//! collaborators a run needs: one shared HTTP client and the record store.

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::SyncOrchestrator;
use crate::services::HttpFetcher;
use crate::storage::LocalStore;

/// Config file name inside the storage directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Load and validate configuration from `{storage_dir}/config.toml`.
///
/// Falls back to defaults if the file is missing or unreadable; invalid
/// values are an error.
pub fn load_config(storage_dir: &Path) -> Result<Config> {
    let config = Config::load_or_default(storage_dir.join(CONFIG_FILE));
    config.validate()?;
    Ok(config)
}

/// Open the local record store described by `config`.
pub fn open_store(config: &Config, storage_dir: &Path) -> LocalStore {
    LocalStore::new(
        config.records_path(storage_dir),
        config.store.page_size,
        config.fields.clone(),
    )
}

/// Build an orchestrator over the local store and an HTTP fetcher.
pub fn build_orchestrator(config: Config, storage_dir: &Path) -> Result<SyncOrchestrator> {
    let store = open_store(&config, storage_dir);
    let fetcher = HttpFetcher::new(&config.fetch)?;

    Ok(SyncOrchestrator::new(
        Arc::new(config),
        Arc::new(store),
        Arc::new(fetcher),
    ))
}
