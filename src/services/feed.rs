// src/services/feed.rs

//! Feed strategy: latest entry of an RSS/Atom/JSON feed.

use feed_rs::model::Entry;
use feed_rs::parser;
use url::Url;

use crate::error::FetchError;
use crate::models::FetchedItem;
use crate::utils::resolve;

/// Title used when the newest entry has none.
pub const UNTITLED: &str = "Untitled";

/// Parse a feed body and return its first entry.
///
/// An empty feed is a valid state and yields `Ok(None)`; a body the parser
/// rejects is a [`FetchError::MalformedFeed`] carrying its diagnostic.
pub fn parse_feed(body: &[u8], feed_url: &Url) -> Result<Option<FetchedItem>, FetchError> {
    let feed = parser::parse(body).map_err(|e| FetchError::malformed_feed(feed_url.as_str(), e))?;

    let Some(entry) = feed.entries.first() else {
        return Ok(None);
    };

    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());
    let link = entry_link(entry).and_then(|href| resolve(feed_url, &href));

    Ok(Some(FetchedItem::new(title, link)))
}

/// Pick the entry's page link: an alternate (or unlabelled) link first, then
/// any link, then an id that is itself a URL.
fn entry_link(entry: &Entry) -> Option<String> {
    let candidates = || entry.links.iter().filter(|l| !l.href.trim().is_empty());

    if let Some(link) = candidates().find(|l| {
        l.rel
            .as_deref()
            .is_none_or(|rel| rel.is_empty() || rel.eq_ignore_ascii_case("alternate"))
    }) {
        return Some(link.href.trim().to_string());
    }
    if let Some(link) = candidates().next() {
        return Some(link.href.trim().to_string());
    }

    let id = entry.id.trim();
    if id.starts_with("http://") || id.starts_with("https://") {
        return Some(id.to_string());
    }
    None
}
