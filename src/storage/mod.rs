//! Record store abstractions.
//!
//! The engine only needs two operations from a store: a paged query over all
//! source records and a partial update of one record. Backends:
//!
//! - [`LocalStore`]: a JSON file of raw records (`records.json`)
//! - [`MemoryStore`]: in-process records, every write kept for inspection
//!
//! ## Records file
//!
//! ```text
//! [
//!   {
//!     "id": "blog-1",
//!     "properties": {
//!       "Name":    { "type": "title", "title": [{ "plain_text": "Blog" }] },
//!       "Status":  { "type": "select", "select": { "name": "Default" } },
//!       "RSS URL": { "type": "url", "url": "example.com/feed" }
//!     }
//!   }
//! ]
//! ```

pub mod local;
pub mod memory;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{RawRecord, RecordUpdate};

// Re-export for convenience
pub use local::LocalStore;
pub use memory::MemoryStore;

/// One page of query results.
#[derive(Debug, Clone, Default)]
pub struct RecordPage {
    pub results: Vec<RawRecord>,
    /// Continuation token; `None` on the last page
    pub next_cursor: Option<String>,
}

/// Trait for record store backends.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch one page of records starting at `cursor`.
    async fn query(&self, cursor: Option<String>) -> Result<RecordPage>;

    /// Partially update a record; `None` fields are left untouched.
    async fn update(&self, id: &str, update: &RecordUpdate) -> Result<()>;

    /// Page through every record until no continuation token is returned.
    ///
    /// A token that was already followed is a store error, so a backend that
    /// keeps handing out the same cursor cannot loop forever.
    async fn list_records(&self) -> Result<Vec<RawRecord>> {
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor = None;

        loop {
            let page = self.query(cursor).await?;
            records.extend(page.results);
            match page.next_cursor {
                Some(next) if !seen.insert(next.clone()) => {
                    return Err(AppError::store(format!(
                        "cursor '{next}' repeated while paging"
                    )));
                }
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        log::debug!("Loaded {} records from store", records.len());
        Ok(records)
    }
}

/// Split `records` into a page starting at an offset cursor.
pub(crate) fn page_of(
    records: &[RawRecord],
    cursor: Option<&str>,
    page_size: usize,
) -> Result<RecordPage> {
    let start = match cursor {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| AppError::store(format!("invalid cursor '{raw}'")))?,
        None => 0,
    };
    let start = start.min(records.len());
    let end = start.saturating_add(page_size.max(1)).min(records.len());

    Ok(RecordPage {
        results: records[start..end].to_vec(),
        next_cursor: (end < records.len()).then(|| end.to_string()),
    })
}
