//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::pipeline::RetryPolicy;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP request settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Retry policy applied to every fetch strategy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Run behavior
    #[serde(default)]
    pub sync: SyncConfig,

    /// Record store location and paging
    #[serde(default)]
    pub store: StoreConfig,

    /// Property names of the tracked fields in the record store
    #[serde(default)]
    pub fields: FieldNames,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        if self.retry.max_attempts == 0 {
            return Err(AppError::validation("retry.max_attempts must be > 0"));
        }
        if self.sync.max_concurrent == 0 {
            return Err(AppError::validation("sync.max_concurrent must be > 0"));
        }
        if self.store.page_size == 0 {
            return Err(AppError::validation("store.page_size must be > 0"));
        }
        if self.store.records_file.trim().is_empty() {
            return Err(AppError::validation("store.records_file is empty"));
        }
        self.fields.validate()
    }

    /// Resolve the records file against the storage directory.
    pub fn records_path(&self, storage_dir: &Path) -> PathBuf {
        storage_dir.join(&self.store.records_file)
    }
}

/// HTTP request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-Agent header; some servers reject default or empty agents
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per strategy, including the first one
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: usize,

    /// Fixed delay between attempts in seconds
    #[serde(default = "defaults::retry_delay")]
    pub delay_secs: u64,
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_secs(self.delay_secs))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
            delay_secs: defaults::retry_delay(),
        }
    }
}

/// Run behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Records checked at the same time (1 = strictly sequential)
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Write a last-updated timestamp alongside an update
    #[serde(default = "defaults::enabled")]
    pub write_timestamp: bool,

    /// Treat items missing either a title or a link as "no item found"
    #[serde(default)]
    pub require_complete_item: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_concurrent: defaults::max_concurrent(),
            write_timestamp: true,
            require_complete_item: false,
        }
    }
}

/// Local record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Records file, relative to the storage directory
    #[serde(default = "defaults::records_file")]
    pub records_file: String,

    /// Records returned per query page
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            records_file: defaults::records_file(),
            page_size: defaults::page_size(),
        }
    }
}

/// Names of the record store properties backing each logical field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldNames {
    #[serde(default = "defaults::field_name")]
    pub name: String,
    #[serde(default = "defaults::field_status")]
    pub status: String,
    #[serde(default = "defaults::field_feed_url")]
    pub feed_url: String,
    #[serde(default = "defaults::field_page_url")]
    pub page_url: String,
    #[serde(default = "defaults::field_selector")]
    pub selector: String,
    #[serde(default = "defaults::field_last_title")]
    pub last_title: String,
    #[serde(default = "defaults::field_last_url")]
    pub last_url: String,
    #[serde(default = "defaults::field_last_updated")]
    pub last_updated: String,
}

impl FieldNames {
    fn validate(&self) -> Result<()> {
        let all = [
            ("fields.name", &self.name),
            ("fields.status", &self.status),
            ("fields.feed_url", &self.feed_url),
            ("fields.page_url", &self.page_url),
            ("fields.selector", &self.selector),
            ("fields.last_title", &self.last_title),
            ("fields.last_url", &self.last_url),
            ("fields.last_updated", &self.last_updated),
        ];
        for (key, value) in all {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("{key} is empty")));
            }
        }
        Ok(())
    }
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            name: defaults::field_name(),
            status: defaults::field_status(),
            feed_url: defaults::field_feed_url(),
            page_url: defaults::field_page_url(),
            selector: defaults::field_selector(),
            last_title: defaults::field_last_title(),
            last_url: defaults::field_last_url(),
            last_updated: defaults::field_last_updated(),
        }
    }
}

mod defaults {
    // Fetch defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        10
    }

    // Retry defaults
    pub fn max_attempts() -> usize {
        2
    }
    pub fn retry_delay() -> u64 {
        3
    }

    // Sync defaults
    pub fn max_concurrent() -> usize {
        1
    }
    pub fn enabled() -> bool {
        true
    }

    // Store defaults
    pub fn records_file() -> String {
        "records.json".into()
    }
    pub fn page_size() -> usize {
        100
    }

    // Field name defaults
    pub fn field_name() -> String {
        "Name".into()
    }
    pub fn field_status() -> String {
        "Status".into()
    }
    pub fn field_feed_url() -> String {
        "RSS URL".into()
    }
    pub fn field_page_url() -> String {
        "Link".into()
    }
    pub fn field_selector() -> String {
        "Selector".into()
    }
    pub fn field_last_title() -> String {
        "Last Title".into()
    }
    pub fn field_last_url() -> String {
        "Last URL".into()
    }
    pub fn field_last_updated() -> String {
        "Last Updated".into()
    }
}
