/// Route module for URL mapping
///
/// - `pattern`: compiles declared URL patterns into logical URL variants
/// - `parser`: splits request URIs into controller/action/id/extra params

pub mod parser;
pub mod pattern;

// Re-export commonly used types
pub use parser::{pair_tokens, parse_uri, ParsedRoute};
pub use pattern::{classify_segment, PatternSegment, UrlPattern};
