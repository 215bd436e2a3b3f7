// src/services/selector.rs

//! Selector strategy: latest entry of an arbitrary page.

use scraper::{Html, Selector};
use url::Url;

use crate::error::FetchError;
use crate::models::FetchedItem;
use crate::utils::resolve;

/// Attribute holding the entry link.
const LINK_ATTR: &str = "href";

/// Parse a CSS selector, mapping failures into the fetch taxonomy.
pub fn parse_selector(selector: &str) -> Result<Selector, FetchError> {
    Selector::parse(selector).map_err(|e| FetchError::selector(selector, format!("{e:?}")))
}

/// Extract the first element matching `selector` from an HTML document.
///
/// The title is the element's trimmed text and the link its `href` resolved
/// against the page URL. An element without `href` still yields an item, with
/// no link. No match yields `Ok(None)`.
pub fn extract_by_selector(
    html: &str,
    selector: &str,
    page_url: &Url,
) -> Result<Option<FetchedItem>, FetchError> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);

    let Some(element) = document.select(&selector).next() else {
        return Ok(None);
    };

    let title = element.text().collect::<String>().trim().to_string();
    let link = element
        .value()
        .attr(LINK_ATTR)
        .and_then(|href| resolve(page_url, href));

    Ok(Some(FetchedItem::new(title, link)))
}
