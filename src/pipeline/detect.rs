//! Change detection against the last recorded item.
//!
//! Either the title or the link may change on its own (a retitled post at the
//! same URL, or a slug change with the same title); either one is an update.

use crate::models::FetchedItem;

/// Verdict for a freshly fetched item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    Unchanged,
    Updated { title: String, link: String },
    /// Source was reachable but yielded nothing usable
    NoItemFound,
}

/// Compares a fetched item with the last-known one.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    /// Require both title and link to be present
    require_complete: bool,
}

impl ChangeDetector {
    /// Create a detector where a title or a link alone is enough.
    pub fn new() -> Self {
        Self {
            require_complete: false,
        }
    }

    /// Create a detector that requires both title and link.
    pub fn strict() -> Self {
        Self {
            require_complete: true,
        }
    }

    pub fn detect(
        &self,
        fetched: Option<&FetchedItem>,
        last_title: &str,
        last_url: &str,
    ) -> Detection {
        let Some(item) = fetched else {
            return Detection::NoItemFound;
        };

        let title = item.title.trim();
        let link = item.link_str();

        let usable = if self.require_complete {
            !title.is_empty() && !link.is_empty()
        } else {
            !title.is_empty() || !link.is_empty()
        };
        if !usable {
            return Detection::NoItemFound;
        }

        if link != last_url.trim() || title != last_title.trim() {
            Detection::Updated {
                title: title.to_string(),
                link: link.to_string(),
            }
        } else {
            Detection::Unchanged
        }
    }
}
