//! Request path extraction.
//!
//! The router matches on the path alone: everything after the authority and
//! before `?` (or `#`).

use http::Uri;
use std::borrow::Cow;

/// Path of a request URI, for origin-form (`/a?b`) and absolute-form
/// (`https://host/a?b`) targets alike.
#[must_use]
pub fn request_path(uri: &Uri) -> &str {
    let path = strip_suffixes(uri.path());
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

/// Path of a raw URL string
///
/// Absolute URLs are parsed with the `url` crate (which also normalizes dot
/// segments); anything else is treated as a path with an optional query
/// string and fragment.
///
/// ```rust
/// use chainrouter::dispatcher::extract_path;
///
/// assert_eq!(extract_path("https://example.com/contacts/ada?x=1#top"), "/contacts/ada");
/// assert_eq!(extract_path("/contacts/ada?x=1"), "/contacts/ada");
/// ```
#[must_use]
pub fn extract_path(raw: &str) -> Cow<'_, str> {
    match url::Url::parse(raw) {
        Ok(url) if !url.cannot_be_a_base() => Cow::Owned(url.path().to_string()),
        _ => {
            let path = strip_suffixes(raw);
            if path.is_empty() {
                Cow::Borrowed("/")
            } else {
                Cow::Borrowed(path)
            }
        }
    }
}

fn strip_suffixes(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}
