/// URL pattern compilation
///
/// Turns one declared pattern such as `/book/show?/:id?` into the ordered list of
/// logical URLs it stands for, most specific first.
/// All functions are **pure**: same input → same output, no side effects.

use std::collections::HashMap;

use crate::error::{RouteError, RouteResult};

const SLASH: char = '/';
const OPTIONAL_MARKER: char = '?';

/// A single segment of a declared URL pattern
///
/// # Examples
///
/// ```
/// use quill_router::route::pattern::{classify_segment, PatternSegment};
///
/// assert_eq!(classify_segment("book"), PatternSegment::Required("book".to_string()));
/// assert_eq!(classify_segment(" show? "), PatternSegment::Optional("show".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// Segment that must be present in a matching URI
    Required(String),
    /// Segment declared with a trailing `?`, which may be absent together with
    /// every segment after it
    Optional(String),
}

impl PatternSegment {
    /// The segment text with surrounding whitespace and the optional marker removed
    pub fn token(&self) -> &str {
        match self {
            PatternSegment::Required(token) | PatternSegment::Optional(token) => token,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, PatternSegment::Optional(_))
    }

    /// Parameter name for capturing tokens (`:id` or `$id`), `None` for literals
    pub fn param_name(&self) -> Option<&str> {
        let token = self.token();
        token
            .strip_prefix(':')
            .or_else(|| token.strip_prefix('$'))
            .filter(|name| !name.is_empty())
    }
}

/// Classifies one raw pattern segment (pure function)
///
/// Whitespace is trimmed first, then a trailing `?` marks the segment optional.
pub fn classify_segment(raw: &str) -> PatternSegment {
    let token = raw.trim();
    match token.strip_suffix(OPTIONAL_MARKER) {
        Some(stripped) => PatternSegment::Optional(stripped.to_string()),
        None => PatternSegment::Required(token.to_string()),
    }
}

/// A compiled URL pattern
///
/// Immutable once built by [`UrlPattern::compile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPattern {
    raw: String,
    segments: Vec<PatternSegment>,
    logical_urls: Vec<String>,
}

/// Fold accumulator for [`UrlPattern::compile`]
#[derive(Default)]
struct CompileState {
    buffer: String,
    urls: Vec<String>,
    segments: Vec<PatternSegment>,
}

impl CompileState {
    fn with_segment(mut self, segment: PatternSegment) -> Self {
        if segment.is_optional() {
            // everything before this segment is one finished variant
            self.urls.push(self.buffer.clone());
        }
        self.buffer.push(SLASH);
        self.buffer.push_str(segment.token());
        self.segments.push(segment);
        self
    }

    fn finish(mut self) -> (Vec<PatternSegment>, Vec<String>) {
        self.urls.push(self.buffer);
        self.urls.reverse();
        (self.segments, self.urls)
    }
}

impl UrlPattern {
    /// Compiles a declared pattern
    ///
    /// Produces one logical URL per optional segment plus the full URL, ordered from
    /// most segments present to fewest.
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidPattern`] when the pattern is blank or lacks the leading `/`.
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_router::UrlPattern;
    ///
    /// let pattern = UrlPattern::compile("/book/show?").unwrap();
    /// assert_eq!(pattern.logical_urls(), ["/book/show", "/book"]);
    /// assert_eq!(pattern.tokens().collect::<Vec<_>>(), ["book", "show"]);
    ///
    /// assert!(UrlPattern::compile("book").is_err());
    /// ```
    pub fn compile(pattern: &str) -> RouteResult<Self> {
        if pattern.trim().is_empty() {
            return Err(RouteError::invalid_pattern(pattern, "pattern cannot be blank"));
        }

        let Some(body) = pattern.strip_prefix(SLASH) else {
            return Err(RouteError::invalid_pattern(pattern, "pattern must start with '/'"));
        };

        let (segments, logical_urls) = split_segments(body)
            .into_iter()
            .map(classify_segment)
            .fold(CompileState::default(), CompileState::with_segment)
            .finish();

        Ok(Self {
            raw: pattern.to_string(),
            segments,
            logical_urls,
        })
    }

    /// The pattern as declared, including the leading `/`
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }

    /// Segment tokens with optional markers already stripped
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(PatternSegment::token)
    }

    /// Concrete URLs this pattern stands for, most specific first
    pub fn logical_urls(&self) -> &[String] {
        &self.logical_urls
    }

    /// Number of leading segments every matching URI must carry
    pub fn required_len(&self) -> usize {
        self.segments
            .iter()
            .position(PatternSegment::is_optional)
            .unwrap_or(self.segments.len())
    }

    /// Structurally matches a canonical path against this pattern
    ///
    /// The candidate must have between [`required_len`](Self::required_len) and all
    /// segments. Literal tokens compare by text, `:name`/`$name` tokens capture the
    /// candidate segment under `name`.
    ///
    /// # Examples
    ///
    /// ```
    /// use quill_router::UrlPattern;
    ///
    /// let pattern = UrlPattern::compile("/book/:id?").unwrap();
    /// assert_eq!(pattern.matches("/book/7", false).unwrap()["id"], "7");
    /// assert!(pattern.matches("/book", false).unwrap().is_empty());
    /// assert!(pattern.matches("/author/7", false).is_none());
    /// ```
    pub fn matches(&self, path: &str, case_insensitive: bool) -> Option<HashMap<String, String>> {
        let candidate = split_segments(path.strip_prefix(SLASH).unwrap_or(path));

        if candidate.len() < self.required_len() || candidate.len() > self.segments.len() {
            return None;
        }

        self.segments
            .iter()
            .zip(candidate.iter())
            .try_fold(HashMap::new(), |mut params, (segment, value)| {
                match segment.param_name() {
                    Some(name) => {
                        params.insert(name.to_string(), value.to_string());
                        Some(params)
                    }
                    None if token_eq(segment.token(), value, case_insensitive) => Some(params),
                    None => None,
                }
            })
    }
}

fn token_eq(token: &str, value: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        token.eq_ignore_ascii_case(value)
    } else {
        token == value
    }
}

/// Splits on `/`, keeping interior empty segments and dropping trailing ones
///
/// An input made only of separators keeps a single empty segment, so `/` compiles to
/// the root URL.
fn split_segments(body: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = body.split(SLASH).collect();
    while parts.len() > 1 && parts.last().is_some_and(|part| part.is_empty()) {
        parts.pop();
    }
    parts
}
