/// URI normalization for request dispatch
///
/// All functions are **pure**: given same input, always produce same output with no side effects.

use std::borrow::Cow;

/// Returns the path portion of a request URI, everything before the first `?`
///
/// # Examples
///
/// ```
/// use quill_router::path::strip_query;
///
/// assert_eq!(strip_query("/book/show/1?x=2"), "/book/show/1");
/// assert_eq!(strip_query("/book"), "/book");
/// ```
pub fn strip_query(uri: &str) -> &str {
    uri.split_once('?').map(|(path, _)| path).unwrap_or(uri)
}

/// Checks whether a path is already in the form dispatch works with
///
/// # Rules
///
/// - Must start with `/`
/// - Must not contain `\` or `?`
/// - Must not end with `/` (except root `/`)
///
/// # Examples
///
/// ```
/// use quill_router::path::is_canonical;
///
/// assert!(is_canonical("/"));
/// assert!(is_canonical("/book/show"));
///
/// assert!(!is_canonical(""));
/// assert!(!is_canonical("book"));
/// assert!(!is_canonical("/book/"));
/// assert!(!is_canonical("\\book"));
/// ```
pub fn is_canonical(path: &str) -> bool {
    if !path.starts_with('/') {
        return false;
    }

    if path.contains('\\') || path.contains('?') {
        return false;
    }

    path == "/" || !path.ends_with('/')
}

/// Normalize a request URI to the canonical dispatch form
///
/// Returns `Cow::Borrowed` when the input is already canonical.
///
/// Steps, in order:
///
/// - Query string: `/book?x=1` → `/book`
/// - Backslashes: `\book\show` → `/book/show`
/// - Leading slash: `book` → `/book`
/// - One trailing slash: `/book/show/` → `/book/show`
///
/// Doubled slashes are left alone; the URI parser sees them as empty segments.
///
/// # Examples
///
/// ```
/// use quill_router::path::normalize_uri;
/// use std::borrow::Cow;
///
/// assert!(matches!(normalize_uri("/book/list"), Cow::Borrowed("/book/list")));
/// assert_eq!(normalize_uri("\\book\\show\\"), "/book/show");
/// assert_eq!(normalize_uri("book/show?id=3"), "/book/show");
/// ```
pub fn normalize_uri(uri: &str) -> Cow<'_, str> {
    let path = strip_query(uri);

    if is_canonical(path) {
        return Cow::Borrowed(path);
    }

    let mut normalized = path.replace('\\', "/");

    if !normalized.starts_with('/') {
        normalized.insert(0, '/');
    }

    if normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }

    Cow::Owned(normalized)
}

/// Splits a canonical path into its segments, without the leading empty one
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.strip_prefix('/')
        .unwrap_or(path)
        .split('/')
        .filter(|segment| !segment.is_empty())
}
