// src/error.rs

//! Unified error handling for the sync engine.
//!
//! [`AppError`] covers infrastructure failures that abort a run (store
//! unreachable, bad configuration). [`FetchError`] is the per-record taxonomy:
//! it is caught at the orchestrator boundary and never aborts a run.

use std::fmt;

use thiserror::Error;

/// Result type alias for application operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be built
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Record store failure
    #[error("Store error: {0}")]
    Store(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a store error.
    pub fn store(message: impl fmt::Display) -> Self {
        Self::Store(message.to_string())
    }
}

/// Why a single record could not be checked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Record has neither a feed URL nor a page URL with a selector
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// URL could not be parsed even after normalization
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Connection, timeout or body read failure
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    /// Server answered with a non-2xx status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Feed body could not be parsed as RSS/Atom
    #[error("Malformed feed at {url}: {message}")]
    MalformedFeed { url: String, message: String },

    /// Source was reachable but yielded no usable title or link
    #[error("No item found")]
    NoItemFound,
}

impl FetchError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create an invalid URL error.
    pub fn invalid_url(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a network error with context.
    pub fn network(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Network {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a malformed feed error carrying the parser diagnostic.
    pub fn malformed_feed(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::MalformedFeed {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Transient failures worth another attempt (and a fallback).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Status { .. } | Self::MalformedFeed { .. }
        )
    }
}
