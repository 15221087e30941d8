/// Request URI parsing
///
/// Maps a raw request URI onto the controller/action/id tuple plus the key/value pairs
/// that follow the id segment.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{RouteError, RouteResult};
use crate::path::normalize_uri;

/// `/controller/action/id/remainder`, every part after the controller optional.
/// Controller and action names are ASCII word characters only.
static URI_STRUCTURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/((?-u:\w)+)/?((?-u:\w)*)/?([^/]*)/?(.*)$")
        .expect("URI structure pattern is valid")
});

/// Structured view of one request URI
///
/// Produced fresh per request by [`parse_uri`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedRoute {
    uri: String,
    /// First path segment, empty when the URI does not have the controller shape
    pub controller_name: String,
    /// Second path segment, possibly empty
    pub action_name: String,
    /// Third path segment, possibly empty
    pub id: String,
    /// Pairs taken two at a time from the segments after the id
    pub extra_params: HashMap<String, String>,
}

impl ParsedRoute {
    /// Canonical URI used for controller lookup: `/controller/action`, or `/controller`
    /// while the action is blank
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn has_action(&self) -> bool {
        !self.action_name.trim().is_empty()
    }

    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// Replaces the action name and recomputes the canonical URI
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_router::parse_uri;
    ///
    /// let mut route = parse_uri("/book").unwrap();
    /// route.set_action_name("list");
    /// assert_eq!(route.uri(), "/book/list");
    /// ```
    pub fn set_action_name(&mut self, action_name: impl Into<String>) {
        self.action_name = action_name.into();
        self.uri = canonical_uri(&self.controller_name, &self.action_name);
    }
}

fn canonical_uri(controller_name: &str, action_name: &str) -> String {
    let uri = format!("/{}/{}", controller_name, action_name);
    match uri.strip_suffix('/') {
        Some(trimmed) => trimmed.to_string(),
        None => uri,
    }
}

/// Pairs `key/value/key/value` tokens; an unpaired trailing token is dropped
///
/// # Examples
///
/// ```
/// use quill_router::route::parser::pair_tokens;
///
/// let params = pair_tokens("color/red/size");
/// assert_eq!(params.len(), 1);
/// assert_eq!(params["color"], "red");
/// ```
pub fn pair_tokens(remainder: &str) -> HashMap<String, String> {
    let tokens: Vec<&str> = remainder.split('/').collect();
    tokens
        .chunks_exact(2)
        .map(|pair| (pair[0].to_string(), pair[1].to_string()))
        .collect()
}

/// Parses a request URI into its route components (pure function)
///
/// The URI is normalized first (query string removed, backslashes converted, one
/// leading `/` ensured, one trailing `/` removed). A URI that does not have the
/// `/controller...` shape parses to a route with blank names whose canonical URI is
/// the normalized path.
///
/// # Errors
///
/// [`RouteError::InvalidArgument`] when `uri` is empty.
///
/// # Examples
///
/// ```
/// use quill_router::parse_uri;
///
/// let route = parse_uri("/book/show/1/color/red?x=2").unwrap();
/// assert_eq!(route.controller_name, "book");
/// assert_eq!(route.action_name, "show");
/// assert_eq!(route.id, "1");
/// assert_eq!(route.extra_params["color"], "red");
/// assert_eq!(route.uri(), "/book/show");
/// ```
pub fn parse_uri(uri: &str) -> RouteResult<ParsedRoute> {
    if uri.is_empty() {
        return Err(RouteError::InvalidArgument);
    }

    let path = normalize_uri(uri);

    let Some(captures) = URI_STRUCTURE.captures(&path) else {
        return Ok(ParsedRoute {
            uri: path.to_string(),
            ..ParsedRoute::default()
        });
    };

    let group = |index: usize| {
        captures
            .get(index)
            .map(|m| m.as_str())
            .unwrap_or_default()
    };

    let controller_name = group(1).to_string();
    let action_name = group(2).to_string();
    let remainder = group(4);

    // a single token cannot form a pair
    let extra_params = if remainder.contains('/') {
        pair_tokens(remainder)
    } else {
        HashMap::new()
    };

    Ok(ParsedRoute {
        uri: canonical_uri(&controller_name, &action_name),
        controller_name,
        action_name,
        id: group(3).to_string(),
        extra_params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_controller_only() {
        let route = parse_uri("/book").unwrap();
        assert_eq!(route.controller_name, "book");
        assert!(!route.has_action());
        assert!(!route.has_id());
        assert_eq!(route.uri(), "/book");
    }

    #[test]
    fn test_parse_controller_action_id() {
        let route = parse_uri("/book/show/1?x=2").unwrap();
        assert_eq!(route.controller_name, "book");
        assert_eq!(route.action_name, "show");
        assert_eq!(route.id, "1");
        assert!(route.extra_params.is_empty());
        assert_eq!(route.uri(), "/book/show");
    }

    #[test]
    fn test_parse_extra_params() {
        let route = parse_uri("/book/show/1/color/red/size/9").unwrap();
        assert_eq!(route.id, "1");
        assert_eq!(route.extra_params.len(), 2);
        assert_eq!(route.extra_params["color"], "red");
        assert_eq!(route.extra_params["size"], "9");
    }

    #[test]
    fn test_parse_drops_unpaired_token() {
        let route = parse_uri("/book/show/1/color/red/size").unwrap();
        assert_eq!(route.extra_params.len(), 1);
        assert_eq!(route.extra_params["color"], "red");

        let route = parse_uri("/book/show/1/color").unwrap();
        assert!(route.extra_params.is_empty());
    }

    #[test]
    fn test_parse_backslashes() {
        let route = parse_uri("\\book\\show\\").unwrap();
        assert_eq!(route.controller_name, "book");
        assert_eq!(route.action_name, "show");
    }

    #[test]
    fn test_parse_names_are_ascii_words() {
        let route = parse_uri("/café/menu").unwrap();
        assert_eq!(route.controller_name, "caf");
        assert!(!route.has_action());
        assert_eq!(route.id, "é");
        assert_eq!(route.uri(), "/caf");

        let route = parse_uri("/book/shöw").unwrap();
        assert_eq!(route.action_name, "sh");
        assert_eq!(route.id, "öw");
    }

    #[test]
    fn test_parse_root() {
        let route = parse_uri("/").unwrap();
        assert!(route.controller_name.is_empty());
        assert_eq!(route.uri(), "/");
    }

    #[test]
    fn test_parse_empty_is_invalid() {
        assert_eq!(parse_uri(""), Err(RouteError::InvalidArgument));
    }

    #[test]
    fn test_set_action_name_recomputes_uri() {
        let mut route = parse_uri("/book/").unwrap();
        assert_eq!(route.uri(), "/book");
        route.set_action_name("list");
        assert_eq!(route.uri(), "/book/list");
        assert_eq!(route.action_name, "list");
    }

    #[test]
    fn test_pair_tokens() {
        assert_eq!(pair_tokens("a/1/b/2").len(), 2);
        assert_eq!(pair_tokens("a").len(), 0);
    }
}
