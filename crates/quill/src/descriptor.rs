// File: src/descriptor.rs
// Purpose: Controller descriptors: naming, action lookup, method policy and interceptors

use axum::http::Method;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::controller::{ActionContext, Controller};
use crate::model::Model;
use crate::naming::{full_controller_name, uncapitalize};
use crate::value::Value;
use quill_router::path::segments;

/// Runs before the action; `Some(Value::Bool(false))` vetoes it
pub type BeforeInterceptor = Arc<dyn Fn(&mut ActionContext<'_>) -> Option<Value> + Send + Sync>;

/// Runs after the action with the final render model
pub type AfterInterceptor = Arc<dyn Fn(&Model) + Send + Sync>;

/// Auto-generated fallback for controllers declared as scaffolded
pub trait Scaffolder: Send + Sync {
    fn supports_action(&self, action_name: &str) -> bool;
}

/// Static description of a controller, as the route registry knows it
pub trait HandlerDescriptor: Send + Sync + fmt::Debug {
    /// Short name, e.g. `Book`
    fn name(&self) -> &str;

    /// Name the object registry knows the controller by, e.g. `BookController`
    fn full_name(&self) -> &str;

    /// Lower-camel name used in URIs, e.g. `book`
    fn logical_name(&self) -> String {
        uncapitalize(self.name())
    }

    fn is_scaffolding(&self) -> bool {
        false
    }

    fn is_http_method_allowed(
        &self,
        controller: &dyn Controller,
        method: &Method,
        action_name: &str,
    ) -> bool;

    /// Action mapped to `uri`, if any
    fn action_name_for_uri(&self, uri: &str) -> Option<String>;

    /// View declared for `uri`, if any
    fn view_for_uri(&self, uri: &str) -> Option<String>;

    fn is_intercepted_before(&self, controller: &dyn Controller, action_name: &str) -> bool;

    fn is_intercepted_after(&self, controller: &dyn Controller, action_name: &str) -> bool;

    fn before_interceptor(&self, controller: &dyn Controller) -> Option<BeforeInterceptor>;

    fn after_interceptor(&self, controller: &dyn Controller) -> Option<AfterInterceptor>;

    /// URL patterns the controller table registers this controller under
    fn url_patterns(&self) -> Vec<String> {
        vec![format!("/{}", self.logical_name())]
    }
}

/// Which actions an interceptor applies to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InterceptScope {
    #[default]
    All,
    Only(Vec<String>),
    Except(Vec<String>),
}

impl InterceptScope {
    pub fn only<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(actions.into_iter().map(Into::into).collect())
    }

    pub fn except<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Except(actions.into_iter().map(Into::into).collect())
    }

    pub fn applies_to(&self, action_name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(actions) => actions.iter().any(|a| a == action_name),
            Self::Except(actions) => !actions.iter().any(|a| a == action_name),
        }
    }
}

/// Default [`HandlerDescriptor`] built from a controller name and its actions
///
/// # Examples
///
/// ```
/// use quill::{ControllerClass, HandlerDescriptor};
///
/// let book = ControllerClass::new("Book").with_actions(["list", "show"]);
/// assert_eq!(book.full_name(), "BookController");
/// assert_eq!(book.action_name_for_uri("/book/show").as_deref(), Some("show"));
/// assert_eq!(book.view_for_uri("/book/show").as_deref(), Some("/book/show"));
/// ```
#[derive(Clone)]
pub struct ControllerClass {
    name: String,
    full_name: String,
    logical_name: String,
    actions: Vec<String>,
    default_action: Option<String>,
    allowed_methods: HashMap<String, Vec<Method>>,
    before: Option<(InterceptScope, BeforeInterceptor)>,
    after: Option<(InterceptScope, AfterInterceptor)>,
    scaffolding: bool,
}

impl ControllerClass {
    /// `name` may carry the `Controller` suffix; it is removed for the short name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let name = match name.strip_suffix("Controller") {
            Some(short) if !short.is_empty() => short.to_string(),
            _ => name,
        };

        Self {
            full_name: full_controller_name(&name),
            logical_name: uncapitalize(&name),
            name,
            actions: Vec::new(),
            default_action: None,
            allowed_methods: HashMap::new(),
            before: None,
            after: None,
            scaffolding: false,
        }
    }

    pub fn with_action(mut self, action_name: impl Into<String>) -> Self {
        let action_name = action_name.into();
        if !self.actions.contains(&action_name) {
            self.actions.push(action_name);
        }
        self
    }

    pub fn with_actions<I, S>(self, action_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        action_names
            .into_iter()
            .fold(self, |class, action_name| class.with_action(action_name))
    }

    pub fn with_default_action(mut self, action_name: impl Into<String>) -> Self {
        let action_name = action_name.into();
        self = self.with_action(action_name.clone());
        self.default_action = Some(action_name);
        self
    }

    /// Restricts an action to the given HTTP methods
    pub fn with_allowed_methods<I>(mut self, action_name: impl Into<String>, methods: I) -> Self
    where
        I: IntoIterator<Item = Method>,
    {
        self.allowed_methods
            .insert(action_name.into(), methods.into_iter().collect());
        self
    }

    pub fn with_before_interceptor<F>(mut self, scope: InterceptScope, interceptor: F) -> Self
    where
        F: Fn(&mut ActionContext<'_>) -> Option<Value> + Send + Sync + 'static,
    {
        self.before = Some((scope, Arc::new(interceptor)));
        self
    }

    pub fn with_after_interceptor<F>(mut self, scope: InterceptScope, interceptor: F) -> Self
    where
        F: Fn(&Model) + Send + Sync + 'static,
    {
        self.after = Some((scope, Arc::new(interceptor)));
        self
    }

    pub fn with_scaffolding(mut self, scaffolding: bool) -> Self {
        self.scaffolding = scaffolding;
        self
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn has_action(&self, action_name: &str) -> bool {
        self.declared_action(action_name).is_some()
    }

    /// Declared spelling of `action_name`, matched ignoring ASCII case
    pub fn declared_action(&self, action_name: &str) -> Option<&str> {
        self.actions
            .iter()
            .find(|a| a.eq_ignore_ascii_case(action_name))
            .map(String::as_str)
    }

    /// Explicit default, else the only action, else `index` when declared
    pub fn default_action(&self) -> Option<&str> {
        if let Some(action_name) = &self.default_action {
            return Some(action_name.as_str());
        }

        match self.actions.as_slice() {
            [only] => Some(only.as_str()),
            _ if self.has_action("index") => Some("index"),
            _ => None,
        }
    }

    /// Segment after the controller segment; `Some("")` for the controller URI itself
    fn action_segment<'u>(&self, uri: &'u str) -> Option<&'u str> {
        let mut parts = segments(quill_router::strip_query(uri));
        let controller = parts.next()?;
        if !controller.eq_ignore_ascii_case(&self.logical_name) {
            return None;
        }
        Some(parts.next().unwrap_or_default())
    }
}

impl HandlerDescriptor for ControllerClass {
    fn name(&self) -> &str {
        &self.name
    }

    fn full_name(&self) -> &str {
        &self.full_name
    }

    fn logical_name(&self) -> String {
        self.logical_name.clone()
    }

    fn is_scaffolding(&self) -> bool {
        self.scaffolding
    }

    fn is_http_method_allowed(
        &self,
        _controller: &dyn Controller,
        method: &Method,
        action_name: &str,
    ) -> bool {
        self.allowed_methods
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(action_name))
            .map_or(true, |(_, methods)| methods.contains(method))
    }

    fn action_name_for_uri(&self, uri: &str) -> Option<String> {
        match self.action_segment(uri)? {
            "" => self.default_action().map(str::to_string),
            action_name => self.declared_action(action_name).map(str::to_string),
        }
    }

    fn view_for_uri(&self, uri: &str) -> Option<String> {
        let action_name = match self.action_name_for_uri(uri) {
            Some(action_name) => action_name,
            None if self.scaffolding => self.action_segment(uri)?.to_string(),
            None => return None,
        };

        if action_name.is_empty() {
            return None;
        }
        Some(format!("/{}/{}", self.logical_name, action_name))
    }

    fn is_intercepted_before(&self, _controller: &dyn Controller, action_name: &str) -> bool {
        self.before
            .as_ref()
            .is_some_and(|(scope, _)| scope.applies_to(action_name))
    }

    fn is_intercepted_after(&self, _controller: &dyn Controller, action_name: &str) -> bool {
        self.after
            .as_ref()
            .is_some_and(|(scope, _)| scope.applies_to(action_name))
    }

    fn before_interceptor(&self, _controller: &dyn Controller) -> Option<BeforeInterceptor> {
        self.before.as_ref().map(|(_, interceptor)| Arc::clone(interceptor))
    }

    fn after_interceptor(&self, _controller: &dyn Controller) -> Option<AfterInterceptor> {
        self.after.as_ref().map(|(_, interceptor)| Arc::clone(interceptor))
    }

    /// One optional-action pattern per declared action, then a catch-all so unknown
    /// actions still reach the controller
    fn url_patterns(&self) -> Vec<String> {
        self.actions
            .iter()
            .map(|action_name| format!("/{}/{}?", self.logical_name, action_name))
            .chain([
                format!("/{}", self.logical_name),
                format!("/{}/:action", self.logical_name),
            ])
            .collect()
    }
}

impl fmt::Debug for ControllerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerClass")
            .field("name", &self.name)
            .field("full_name", &self.full_name)
            .field("actions", &self.actions)
            .field("default_action", &self.default_action())
            .field("scaffolding", &self.scaffolding)
            .field("before", &self.before.as_ref().map(|(scope, _)| scope))
            .field("after", &self.after.as_ref().map(|(scope, _)| scope))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ActionTable;

    #[test]
    fn test_names() {
        let class = ControllerClass::new("BookStore");
        assert_eq!(class.name(), "BookStore");
        assert_eq!(class.full_name(), "BookStoreController");
        assert_eq!(class.logical_name(), "bookStore");

        let suffixed = ControllerClass::new("BookController");
        assert_eq!(suffixed.name(), "Book");
        assert_eq!(suffixed.full_name(), "BookController");
    }

    #[test]
    fn test_default_action() {
        assert_eq!(ControllerClass::new("Book").default_action(), None);
        assert_eq!(
            ControllerClass::new("Book").with_action("list").default_action(),
            Some("list")
        );
        assert_eq!(
            ControllerClass::new("Book")
                .with_actions(["list", "index"])
                .default_action(),
            Some("index")
        );
        assert_eq!(
            ControllerClass::new("Book")
                .with_actions(["list", "index"])
                .with_default_action("list")
                .default_action(),
            Some("list")
        );
    }

    #[test]
    fn test_uri_lookups() {
        let class = ControllerClass::new("Book")
            .with_actions(["list", "show"])
            .with_default_action("list");

        assert_eq!(class.action_name_for_uri("/book").as_deref(), Some("list"));
        assert_eq!(class.action_name_for_uri("/book/show").as_deref(), Some("show"));
        assert_eq!(class.action_name_for_uri("/book/nope"), None);
        assert_eq!(class.action_name_for_uri("/author/show"), None);

        assert_eq!(class.view_for_uri("/book").as_deref(), Some("/book/list"));
        assert_eq!(class.view_for_uri("/book/show").as_deref(), Some("/book/show"));
        assert_eq!(class.view_for_uri("/book/nope"), None);
    }

    #[test]
    fn test_scaffolded_view_for_undeclared_action() {
        let class = ControllerClass::new("Book").with_scaffolding(true);
        assert_eq!(class.view_for_uri("/book/edit").as_deref(), Some("/book/edit"));
        assert_eq!(class.view_for_uri("/book"), None);
    }

    #[test]
    fn test_allowed_methods() {
        let class = ControllerClass::new("Book")
            .with_actions(["list", "save"])
            .with_allowed_methods("save", [Method::POST]);
        let controller = ActionTable::new();

        assert!(class.is_http_method_allowed(&controller, &Method::GET, "list"));
        assert!(class.is_http_method_allowed(&controller, &Method::POST, "save"));
        assert!(!class.is_http_method_allowed(&controller, &Method::GET, "save"));
        assert!(!class.is_http_method_allowed(&controller, &Method::GET, "SAVE"));
    }

    #[test]
    fn test_action_names_ignore_case() {
        let class = ControllerClass::new("Book").with_actions(["list", "showAll"]);

        assert_eq!(class.declared_action("SHOWALL"), Some("showAll"));
        assert_eq!(class.action_name_for_uri("/BOOK/Showall").as_deref(), Some("showAll"));
        assert_eq!(class.view_for_uri("/Book/SHOWALL").as_deref(), Some("/book/showAll"));
        assert!(class.has_action("LIST"));
    }

    #[test]
    fn test_intercept_scope() {
        let class = ControllerClass::new("Book")
            .with_actions(["list", "save", "delete"])
            .with_before_interceptor(InterceptScope::except(["list"]), |_| None)
            .with_after_interceptor(InterceptScope::only(["save"]), |_| {});
        let controller = ActionTable::new();

        assert!(!class.is_intercepted_before(&controller, "list"));
        assert!(class.is_intercepted_before(&controller, "delete"));
        assert!(class.is_intercepted_after(&controller, "save"));
        assert!(!class.is_intercepted_after(&controller, "delete"));
        assert!(class.before_interceptor(&controller).is_some());
    }

    #[test]
    fn test_url_patterns() {
        let class = ControllerClass::new("Book").with_actions(["list", "show"]);
        assert_eq!(
            class.url_patterns(),
            vec!["/book/list?", "/book/show?", "/book", "/book/:action"]
        );
    }
}
