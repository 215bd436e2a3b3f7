//! Items extracted from a source and per-record run outcomes.

use std::fmt;

use crate::error::FetchError;

/// The most recent item of a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedItem {
    /// Entry title (may be empty for selector matches without text)
    pub title: String,

    /// Absolute link, absent when the matched element carries none
    pub link: Option<String>,
}

impl FetchedItem {
    pub fn new(title: impl Into<String>, link: Option<String>) -> Self {
        Self {
            title: title.into(),
            link,
        }
    }

    /// Trimmed link, empty if absent.
    pub fn link_str(&self) -> &str {
        self.link.as_deref().map(str::trim).unwrap_or("")
    }
}

/// Result of checking one record during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Status not eligible for checking
    Skipped,
    Unchanged,
    Updated { title: String, link: String },
    Error(FetchError),
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped => f.write_str("skipped"),
            Self::Unchanged => f.write_str("unchanged"),
            Self::Updated { title, link } => write!(f, "updated: {title} ({link})"),
            Self::Error(reason) => write!(f, "error: {reason}"),
        }
    }
}
