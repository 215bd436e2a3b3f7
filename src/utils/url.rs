// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

/// Canonicalize an operator-entered source URL.
///
/// Inputs without a `scheme://` prefix get `https://` prepended. Anything
/// else is returned as-is (trimmed); malformed strings fail later at fetch
/// time.
///
/// # Examples
/// ```
/// use feedwatch::utils::url::normalize;
///
/// assert_eq!(normalize("example.com/feed"), "https://example.com/feed");
/// assert_eq!(normalize("http://example.com"), "http://example.com");
/// ```
pub fn normalize(url: &str) -> String {
    let trimmed = url.trim();
    if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

fn has_scheme(url: &str) -> bool {
    let Some(idx) = url.find("://") else {
        return false;
    };
    let scheme = &url[..idx];
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Resolve a potentially relative link against a base URL.
///
/// Returns `None` for blank links or links that cannot be joined.
pub fn resolve(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(|u| u.to_string())
}
