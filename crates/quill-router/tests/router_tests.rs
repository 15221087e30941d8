//! Integration tests for quill-router
//!
//! Tests are organized by feature area and cover:
//! - Pattern compilation and variant ordering
//! - URI parsing and normalization
//! - Mapping table lookups
//! - Compile/parse round trips

use pretty_assertions::assert_eq;
use quill_router::*;
use rstest::rstest;

fn segment_count(url: &str) -> usize {
    url.split('/').filter(|s| !s.is_empty()).count()
}

// ============================================================================
// Pattern compilation
// ============================================================================

#[rstest]
#[case("/book", 0)]
#[case("/book/show?", 1)]
#[case("/book/:id?/edit?", 2)]
#[case("/shop/$category?/$product?/reviews?", 3)]
#[case("/a/b/c?/d?/e?/f?", 4)]
fn test_variant_count_and_order(#[case] raw: &str, #[case] optional: usize) {
    let pattern = UrlPattern::compile(raw).unwrap();
    let urls = pattern.logical_urls();

    assert_eq!(urls.len(), optional + 1);
    assert_eq!(urls[0], raw.replace('?', ""));

    for pair in urls.windows(2) {
        assert!(segment_count(&pair[0]) > segment_count(&pair[1]));
    }
}

#[test]
fn test_compile_book_show() {
    let pattern = UrlPattern::compile("/book/show?").unwrap();
    assert_eq!(pattern.logical_urls(), ["/book/show", "/book"]);
    assert_eq!(pattern.tokens().collect::<Vec<_>>(), ["book", "show"]);
}

#[test]
fn test_compile_optional_param_token_is_literal() {
    let pattern = UrlPattern::compile("/book/:id?/edit?").unwrap();
    assert_eq!(pattern.logical_urls(), ["/book/:id/edit", "/book/:id", "/book"]);
    assert!(pattern.segments()[1].is_optional());
    assert_eq!(pattern.segments()[1].token(), ":id");
}

#[rstest]
#[case("")]
#[case("  ")]
#[case("book")]
#[case("book/show?")]
fn test_compile_invalid(#[case] raw: &str) {
    let err = UrlPattern::compile(raw).unwrap_err();
    assert!(matches!(err, RouteError::InvalidPattern { .. }));
}

// ============================================================================
// URI parsing
// ============================================================================

#[test]
fn test_parse_strips_query_string() {
    let route = parse_uri("/book/show/1?x=2").unwrap();
    assert_eq!(route.controller_name, "book");
    assert_eq!(route.action_name, "show");
    assert_eq!(route.id, "1");
}

#[test]
fn test_parse_extra_params() {
    let route = parse_uri("/book/show/1/color/red/size/9").unwrap();
    assert_eq!(route.extra_params.len(), 2);
    assert_eq!(route.extra_params.get("color").map(String::as_str), Some("red"));
    assert_eq!(route.extra_params.get("size").map(String::as_str), Some("9"));
}

#[rstest]
#[case("\\book\\show\\")]
#[case("/book/show/")]
#[case("book/show")]
#[case("/book/show?page=2")]
fn test_parse_normalizes(#[case] uri: &str) {
    let route = parse_uri(uri).unwrap();
    assert_eq!(route.controller_name, "book");
    assert_eq!(route.action_name, "show");
    assert_eq!(route.uri(), "/book/show");
}

#[test]
fn test_parse_empty_uri() {
    assert_eq!(parse_uri(""), Err(RouteError::InvalidArgument));
}

// ============================================================================
// Mapping table
// ============================================================================

#[test]
fn test_router_longest_match_first() {
    let router = Router::new()
        .with_mapping("/book/:id?/edit?", "edit")
        .unwrap();

    let matched = router.match_uri("/book/5/edit").unwrap();
    assert_eq!(matched.target, &"edit");
    assert_eq!(matched.params.get("id").map(String::as_str), Some("5"));

    let matched = router.match_uri("/book/5").unwrap();
    assert_eq!(matched.params.get("id").map(String::as_str), Some("5"));

    let matched = router.match_uri("/book").unwrap();
    assert!(matched.params.is_empty());

    assert!(router.match_uri("/book/5/delete").is_none());
}

#[test]
fn test_router_mappings_iter() {
    let router = Router::new()
        .with_mapping("/book/list?", 'b')
        .unwrap()
        .with_mapping("/author/list?", 'a')
        .unwrap();

    let raws: Vec<&str> = router.mappings().map(|(pattern, _)| pattern.raw()).collect();
    assert_eq!(raws, vec!["/book/list?", "/author/list?"]);
}

// ============================================================================
// Round trips
// ============================================================================

#[rstest]
#[case("/book/show?", "book", "show")]
#[case("/author/list", "author", "list")]
#[case("/shop/checkout?/confirm?", "shop", "checkout")]
fn test_compile_then_parse_round_trip(
    #[case] raw: &str,
    #[case] controller: &str,
    #[case] action: &str,
) {
    let pattern = UrlPattern::compile(raw).unwrap();
    let router = Router::new().with_mapping(raw, controller).unwrap();

    let most_specific = &pattern.logical_urls()[0];
    let route = parse_uri(most_specific).unwrap();

    assert_eq!(route.controller_name, controller);
    assert_eq!(route.action_name, action);
    assert_eq!(router.lookup(route.uri()), Some(&controller));
}
