//! # Quill Router
//!
//! URL mapping primitives for the Quill MVC dispatcher:
//! - Pattern compilation with optional trailing segments (`/book/show?`)
//! - Request URI parsing into controller, action, id and extra params
//! - A mapping table that resolves the most specific logical URL first
//!
//! ## Path Normalization
//!
//! Request URIs are normalized before parsing:
//! - Query strings: `/book?x=1` → `/book`
//! - Backslashes: `\book\show` → `/book/show`
//! - Missing leading slash: `book` → `/book`
//! - One trailing slash: `/book/` → `/book`
//!
//! ## Example
//!
//! ```
//! use quill_router::{parse_uri, Router};
//!
//! let router = Router::new()
//!     .with_mapping("/book/show?", "BookController")
//!     .unwrap();
//!
//! let route = parse_uri("/book/show/1").unwrap();
//! assert_eq!(router.lookup(route.uri()), Some(&"BookController"));
//! assert_eq!(router.lookup("/book"), Some(&"BookController"));
//! ```

use std::collections::HashMap;

// ============================================================================
// Module Declarations
// ============================================================================

mod error;
pub mod path;
pub mod route;

pub use error::{RouteError, RouteResult};
pub use path::{is_canonical, normalize_uri, strip_query};
pub use route::parser::{parse_uri, ParsedRoute};
pub use route::pattern::{classify_segment, PatternSegment, UrlPattern};

// ============================================================================
// Core Types
// ============================================================================

/// Result of matching a URI against the mapping table
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch<'a, T> {
    /// The mapped target
    pub target: &'a T,
    /// The pattern the URI matched
    pub pattern: &'a UrlPattern,
    /// Values captured by `:name`/`$name` tokens
    pub params: HashMap<String, String>,
}

/// Table of compiled URL patterns and the targets they map to
///
/// Every logical URL of a registered pattern is indexed for exact lookup. A URL
/// already claimed by an earlier registration keeps its original target.
#[derive(Debug, Clone)]
pub struct Router<T> {
    mappings: Vec<(UrlPattern, T)>,
    logical_urls: HashMap<String, usize>,
    case_insensitive: bool,
}

impl<T> Router<T> {
    /// Creates an empty, case-sensitive router
    pub fn new() -> Self {
        Self {
            mappings: Vec::new(),
            logical_urls: HashMap::new(),
            case_insensitive: false,
        }
    }

    /// Configures case sensitivity (functional builder)
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_router::Router;
    ///
    /// let router = Router::new()
    ///     .with_case_insensitive(true)
    ///     .with_mapping("/book/list", 1)
    ///     .unwrap();
    /// assert_eq!(router.lookup("/Book/LIST"), Some(&1));
    /// ```
    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self.logical_urls = self
            .mappings
            .iter()
            .enumerate()
            .flat_map(|(index, (pattern, _))| {
                pattern.logical_urls().iter().map(move |url| (url, index))
            })
            .fold(HashMap::new(), |mut urls, (url, index)| {
                urls.entry(fold_case(url, case_insensitive)).or_insert(index);
                urls
            });
        self
    }

    /// Adds a mapping (functional builder)
    pub fn with_mapping(mut self, pattern: &str, target: T) -> RouteResult<Self> {
        self.add_mapping(pattern, target)?;
        Ok(self)
    }

    /// Compiles `pattern` and maps each of its logical URLs to `target`
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidPattern`] when the pattern does not compile.
    pub fn add_mapping(&mut self, pattern: &str, target: T) -> RouteResult<&UrlPattern> {
        let compiled = UrlPattern::compile(pattern)?;
        let index = self.mappings.len();

        for url in compiled.logical_urls() {
            self.logical_urls
                .entry(fold_case(url, self.case_insensitive))
                .or_insert(index);
        }

        self.mappings.push((compiled, target));
        Ok(&self.mappings[index].0)
    }

    /// Matches a request path against the table
    ///
    /// The path is normalized first. An exact logical-URL hit wins; otherwise patterns
    /// are tried structurally in registration order.
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_router::Router;
    ///
    /// let router = Router::new()
    ///     .with_mapping("/author/:name/books?", "authors")
    ///     .unwrap();
    ///
    /// let matched = router.match_uri("/author/tolkien/books").unwrap();
    /// assert_eq!(matched.target, &"authors");
    /// assert_eq!(matched.params["name"], "tolkien");
    /// ```
    pub fn match_uri(&self, uri: &str) -> Option<RouteMatch<'_, T>> {
        let path = normalize_uri(uri);

        if let Some(&index) = self.logical_urls.get(&fold_case(&path, self.case_insensitive)) {
            let (pattern, target) = &self.mappings[index];
            return Some(RouteMatch {
                target,
                pattern,
                params: pattern.matches(&path, self.case_insensitive).unwrap_or_default(),
            });
        }

        self.mappings.iter().find_map(|(pattern, target)| {
            pattern
                .matches(&path, self.case_insensitive)
                .map(|params| RouteMatch {
                    target,
                    pattern,
                    params,
                })
        })
    }

    /// Returns the target mapped to `uri`, if any
    pub fn lookup(&self, uri: &str) -> Option<&T> {
        self.match_uri(uri).map(|matched| matched.target)
    }

    /// Registered patterns with their targets, in registration order
    pub fn mappings(&self) -> impl Iterator<Item = (&UrlPattern, &T)> {
        self.mappings.iter().map(|(pattern, target)| (pattern, target))
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn fold_case(url: &str, case_insensitive: bool) -> String {
    if case_insensitive {
        url.to_ascii_lowercase()
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_exact_lookup() {
        let router = Router::new()
            .with_mapping("/book/list?", "book")
            .unwrap()
            .with_mapping("/author/list?", "author")
            .unwrap();

        assert_eq!(router.lookup("/book/list"), Some(&"book"));
        assert_eq!(router.lookup("/book"), Some(&"book"));
        assert_eq!(router.lookup("/author/"), Some(&"author"));
        assert_eq!(router.lookup("/publisher"), None);
        assert_eq!(router.len(), 2);
    }

    #[test]
    fn test_router_first_registration_keeps_url() {
        let router = Router::new()
            .with_mapping("/book/list?", 1)
            .unwrap()
            .with_mapping("/book/show?", 2)
            .unwrap();

        assert_eq!(router.lookup("/book"), Some(&1));
        assert_eq!(router.lookup("/book/show"), Some(&2));
    }

    #[test]
    fn test_router_rejects_bad_pattern() {
        let mut router: Router<u8> = Router::new();
        assert!(router.add_mapping("book", 1).is_err());
        assert!(router.is_empty());
    }

    #[test]
    fn test_router_case_insensitive_after_registration() {
        let router = Router::new()
            .with_mapping("/book/list", 1)
            .unwrap()
            .with_case_insensitive(true);

        assert_eq!(router.lookup("/BOOK/list"), Some(&1));
    }
}
