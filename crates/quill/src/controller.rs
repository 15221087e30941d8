// File: src/controller.rs
// Purpose: Per-request action context, action return values and the controller trait

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::sync::Arc;

use crate::flash::FlashHandle;
use crate::model::{Model, ModelAndView};
use crate::request_context::Request;
use crate::response::ResponseSink;
use crate::value::Value;

/// Default flash key the chain model travels under
pub const DEFAULT_CHAIN_MODEL_KEY: &str = "chainModel";

/// Validation and binding errors collected by an action, by field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Errors(HashMap<String, Vec<String>>);

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error against a field
    pub fn reject(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn field_errors(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(field, messages)| {
                    let messages = messages.iter().map(|m| Value::from(m.as_str())).collect();
                    (field.clone(), Value::Array(messages))
                })
                .collect(),
        )
    }
}

impl From<HashMap<String, Vec<String>>> for Errors {
    fn from(errors: HashMap<String, Vec<String>>) -> Self {
        Self(errors)
    }
}

/// What an action handed back
#[derive(Debug, Clone, Default)]
pub enum ActionReturn {
    /// No return value
    #[default]
    None,
    /// A key/value model for the declared view
    Model(Model),
    /// An explicit render instruction
    View(ModelAndView),
    /// Any other value; the handler's property bag becomes the model
    Object(Value),
}

impl From<()> for ActionReturn {
    fn from(_: ()) -> Self {
        ActionReturn::None
    }
}

impl From<Model> for ActionReturn {
    fn from(model: Model) -> Self {
        ActionReturn::Model(model)
    }
}

impl From<ModelAndView> for ActionReturn {
    fn from(mv: ModelAndView) -> Self {
        ActionReturn::View(mv)
    }
}

impl From<Value> for ActionReturn {
    fn from(value: Value) -> Self {
        ActionReturn::Object(value)
    }
}

/// Per-request state an action runs against
///
/// Built fresh for every dispatch and threaded through the interceptors, the action
/// and the return-value reduction.
pub struct ActionContext<'r> {
    pub controller_name: String,
    pub action_name: String,
    /// `/controller`
    pub controller_uri: String,
    /// `/controller/action`
    pub action_uri: String,
    /// Request parameters, path-derived id and extra params, invocation params
    pub params: Model,
    /// The handler's own properties; the implicit model when no map is returned
    pub properties: Model,
    pub errors: Errors,
    /// Model chained from the previous request
    pub chain_model: Model,
    /// Explicit render instruction; wins over the return value
    pub model_and_view: Option<ModelAndView>,
    /// Set to `false` when the action produced the response itself
    pub render_view: bool,
    flash: FlashHandle,
    chain_model_key: String,
    request: &'r mut dyn Request,
    response: &'r mut dyn ResponseSink,
}

impl<'r> ActionContext<'r> {
    pub fn new(
        request: &'r mut dyn Request,
        response: &'r mut dyn ResponseSink,
        flash: FlashHandle,
    ) -> Self {
        Self {
            controller_name: String::new(),
            action_name: String::new(),
            controller_uri: String::new(),
            action_uri: String::new(),
            params: Model::new(),
            properties: Model::new(),
            errors: Errors::new(),
            chain_model: Model::new(),
            model_and_view: None,
            render_view: true,
            flash,
            chain_model_key: DEFAULT_CHAIN_MODEL_KEY.to_string(),
            request,
            response,
        }
    }

    pub fn with_chain_model_key(mut self, key: impl Into<String>) -> Self {
        self.chain_model_key = key.into();
        self
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn flash(&self) -> &FlashHandle {
        &self.flash
    }

    pub fn request(&self) -> &dyn Request {
        &*self.request
    }

    pub fn request_mut(&mut self) -> &mut dyn Request {
        &mut *self.request
    }

    pub fn response(&self) -> &dyn ResponseSink {
        &*self.response
    }

    pub fn response_mut(&mut self) -> &mut dyn ResponseSink {
        &mut *self.response
    }

    /// Sets the explicit render instruction
    pub fn render(&mut self, view_name: impl Into<String>, model: Model) {
        self.model_and_view = Some(ModelAndView::new(view_name, model));
    }

    pub fn redirect(&mut self, location: &str) -> io::Result<()> {
        self.response.send_redirect(location)
    }

    /// Carries `model` across a redirect to another action of this controller
    pub fn chain(&mut self, action_name: &str, model: Model) -> io::Result<()> {
        self.flash
            .lock()
            .put(self.chain_model_key.clone(), Value::from(model));
        let location = format!("{}/{}", self.controller_uri, action_name);
        self.redirect(&location)
    }
}

impl fmt::Debug for ActionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionContext")
            .field("controller_name", &self.controller_name)
            .field("action_name", &self.action_name)
            .field("params", &self.params)
            .finish()
    }
}

/// A request handler exposing named actions
pub trait Controller: Send {
    /// Invokes the named action
    ///
    /// Returns `None` when the controller has no such action.
    fn invoke_action(
        &mut self,
        name: &str,
        ctx: &mut ActionContext<'_>,
    ) -> Option<anyhow::Result<ActionReturn>>;

    /// Properties seeding [`ActionContext::properties`]
    fn properties(&self) -> Model {
        Model::new()
    }
}

pub type ActionFn =
    Arc<dyn Fn(&mut ActionContext<'_>) -> anyhow::Result<ActionReturn> + Send + Sync>;

/// Controller backed by a table of action closures
#[derive(Clone, Default)]
pub struct ActionTable {
    actions: HashMap<String, ActionFn>,
    properties: Model,
}

impl ActionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_action<F>(mut self, name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut ActionContext<'_>) -> anyhow::Result<ActionReturn> + Send + Sync + 'static,
    {
        self.actions.insert(name.into(), Arc::new(action));
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key, value);
        self
    }

    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}

impl Controller for ActionTable {
    fn invoke_action(
        &mut self,
        name: &str,
        ctx: &mut ActionContext<'_>,
    ) -> Option<anyhow::Result<ActionReturn>> {
        self.actions.get(name).map(|action| action(ctx))
    }

    fn properties(&self) -> Model {
        self.properties.clone()
    }
}

impl fmt::Debug for ActionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.action_names().collect();
        names.sort_unstable();
        f.debug_struct("ActionTable")
            .field("actions", &names)
            .field("properties", &self.properties)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request_context::HttpRequest;
    use crate::response::BufferedResponse;

    #[test]
    fn test_errors_reject() {
        let mut errors = Errors::new();
        assert!(!errors.has_errors());

        errors.reject("title", "Title is required");
        errors.reject("title", "Title is too short");

        assert!(errors.has_errors());
        assert_eq!(errors.field_errors("title").len(), 2);
        assert!(errors.field_errors("author").is_empty());
    }

    #[test]
    fn test_action_table_invokes_by_name() {
        let mut controller = ActionTable::new()
            .with_action("list", |_| Ok(Model::new().with("count", 2).into()))
            .with_property("title", "Books");

        let mut request = HttpRequest::get("/book/list");
        let mut response = BufferedResponse::new();
        let mut ctx = ActionContext::new(&mut request, &mut response, FlashHandle::default());

        let returned = controller.invoke_action("list", &mut ctx).unwrap().unwrap();
        assert!(matches!(returned, ActionReturn::Model(ref m) if m.len() == 1));
        assert!(controller.invoke_action("missing", &mut ctx).is_none());
        assert_eq!(controller.properties().get("title"), Some(&Value::from("Books")));
    }

    #[test]
    fn test_chain_puts_model_in_flash_and_redirects() {
        let mut request = HttpRequest::get("/book/save");
        let mut response = BufferedResponse::new();
        let flash = FlashHandle::default();

        {
            let mut ctx = ActionContext::new(&mut request, &mut response, flash.clone());
            ctx.controller_uri = "/book".to_string();
            ctx.chain("show", Model::new().with("saved", true)).unwrap();
            assert!(ctx.response().is_redirected());
        }

        assert_eq!(response.location(), Some("/book/show"));
        let scope = flash.lock();
        let chained = scope.get(DEFAULT_CHAIN_MODEL_KEY).and_then(Model::from_value).unwrap();
        assert_eq!(chained.get("saved"), Some(&Value::from(true)));
    }
}
