// File: src/request_context.rs
// Purpose: Incoming request boundary with query params, form data and attributes

use axum::http::Method;
use std::collections::HashMap;

use crate::value::Value;

/// The incoming request as seen by the dispatcher
///
/// The transport layer owns the request; dispatch reads parameters and writes
/// attributes through this trait.
pub trait Request {
    /// HTTP method (GET, POST, PUT, DELETE, etc.)
    fn method(&self) -> &Method;

    /// Looks up a query or form parameter
    fn parameter(&self, name: &str) -> Option<&str>;

    /// Every query and form parameter
    fn parameters(&self) -> HashMap<String, String>;

    fn attribute(&self, name: &str) -> Option<&Value>;

    fn set_attribute(&mut self, name: &str, value: Value);

    /// Session the flash scope is keyed on, if the request has one
    fn session_id(&self) -> Option<&str> {
        None
    }
}

/// Default in-memory request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method (GET, POST, PUT, DELETE, etc.)
    pub method: Method,

    /// Request path
    pub path: String,

    /// Query parameters from URL (?key=value)
    pub query: QueryParams,

    /// Form data from POST/PUT requests
    pub form: FormData,

    /// Request-scoped attributes written during dispatch
    pub attributes: HashMap<String, Value>,

    /// Session identifier
    pub session_id: Option<String>,
}

impl HttpRequest {
    /// Create a new request
    ///
    /// The path may carry a query string; it is split off into [`QueryParams`].
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path.to_string(), QueryParams::parse(query)),
            None => (path, QueryParams::default()),
        };

        Self {
            method,
            path,
            query,
            form: FormData::new(),
            attributes: HashMap::new(),
            session_id: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn with_form(mut self, form: FormData) -> Self {
        self.form = form;
        self
    }

    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key, value);
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

impl Request for HttpRequest {
    fn method(&self) -> &Method {
        &self.method
    }

    fn parameter(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .or_else(|| self.form.get(name))
            .map(String::as_str)
    }

    fn parameters(&self) -> HashMap<String, String> {
        let mut params = self.form.as_map().clone();
        params.extend(self.query.as_map().clone());
        params
    }

    fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    fn set_attribute(&mut self, name: &str, value: Value) {
        self.attributes.insert(name.to_string(), value);
    }

    fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

/// Query parameters from URL
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    params: HashMap<String, String>,
}

impl QueryParams {
    /// Parse a raw query string (`a=1&b=two%20words`)
    ///
    /// Keys without `=` map to an empty value; pairs that fail to decode keep their
    /// raw text. The first occurrence of a repeated key wins.
    pub fn parse(query: &str) -> Self {
        let mut params = HashMap::new();

        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params
                .entry(decode(key))
                .or_insert_with(|| decode(value));
        }

        Self { params }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Get a query parameter value
    pub fn get(&self, key: &str) -> Option<&String> {
        self.params.get(key)
    }

    /// Get a query parameter as a specific type
    pub fn get_as<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.params.get(key)?.parse().ok()
    }

    /// Get as HashMap
    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.params
    }
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}

/// Form data from POST/PUT requests
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
}

impl FormData {
    /// Create empty form data
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Create from form fields with automatic trimming
    pub fn from_fields(fields: HashMap<String, String>) -> Self {
        // Trim all string values by default
        let trimmed_fields = fields
            .into_iter()
            .map(|(k, v)| (k, v.trim().to_string()))
            .collect();

        Self {
            fields: trimmed_fields,
        }
    }

    /// Get a form field value
    pub fn get(&self, key: &str) -> Option<&String> {
        self.fields.get(key)
    }

    /// Get as HashMap
    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.fields
    }
}
