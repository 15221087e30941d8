// File: src/dispatch/mod.rs
// Purpose: Dispatch one request URI to a controller action and decide what to render

mod reduce;

use axum::http::StatusCode;
use std::sync::Arc;
use tracing::{debug, debug_span, trace, warn};
use uuid::Uuid;

use quill_router::{parse_uri, ParsedRoute};

use crate::config::DispatchConfig;
use crate::controller::{ActionContext, Controller};
use crate::descriptor::{HandlerDescriptor, Scaffolder};
use crate::error::{DispatchError, DispatchResult};
use crate::flash::{FlashScope, FlashStore};
use crate::model::{Model, ModelAndView};
use crate::naming::property_name_representation;
use crate::registry::{ControllerRegistry, ObjectRegistry};
use crate::request_context::Request;
use crate::response::ResponseSink;
use crate::value::Value;

use reduce::reduce_action_return;

/// Why a dispatch ended without a render instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoRenderReason {
    /// The action disabled rendering and wrote the response itself
    RenderViewDisabled,
    /// Nothing was returned and no view is declared for the URI
    NoView,
    /// The before interceptor returned `false`
    Vetoed,
    /// The action issued a redirect
    Redirected,
    /// 403 sent: the HTTP method is not allowed for the action
    Forbidden,
    /// 404 sent: the controller has no such action
    NotFound,
}

/// Result of one dispatch
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    Render(ModelAndView),
    NoRender(NoRenderReason),
}

impl DispatchOutcome {
    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render(_))
    }

    pub fn model_and_view(&self) -> Option<&ModelAndView> {
        match self {
            Self::Render(mv) => Some(mv),
            Self::NoRender(_) => None,
        }
    }

    pub fn into_model_and_view(self) -> Option<ModelAndView> {
        match self {
            Self::Render(mv) => Some(mv),
            Self::NoRender(_) => None,
        }
    }

    pub fn no_render_reason(&self) -> Option<NoRenderReason> {
        match self {
            Self::Render(_) => None,
            Self::NoRender(reason) => Some(*reason),
        }
    }
}

/// Routes request URIs to controller actions
///
/// Holds only immutable collaborators; all per-request state lives in the
/// [`ActionContext`] built by [`DispatchEngine::dispatch`], so one engine can serve
/// concurrent requests.
#[derive(Clone)]
pub struct DispatchEngine {
    controllers: Arc<dyn ControllerRegistry>,
    objects: Arc<dyn ObjectRegistry>,
    flash: Arc<dyn FlashStore>,
    config: DispatchConfig,
}

impl DispatchEngine {
    pub fn new<C, O, F>(controllers: C, objects: O, flash: F) -> Self
    where
        C: ControllerRegistry + 'static,
        O: ObjectRegistry + 'static,
        F: FlashStore + 'static,
    {
        Self::from_shared(Arc::new(controllers), Arc::new(objects), Arc::new(flash))
    }

    pub fn from_shared(
        controllers: Arc<dyn ControllerRegistry>,
        objects: Arc<dyn ObjectRegistry>,
        flash: Arc<dyn FlashStore>,
    ) -> Self {
        Self {
            controllers,
            objects,
            flash,
            config: DispatchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn controllers(&self) -> &Arc<dyn ControllerRegistry> {
        &self.controllers
    }

    /// Dispatches `uri` and reduces the action's result to an outcome
    ///
    /// `params` are merged into the action's parameters right before it runs.
    ///
    /// # Errors
    ///
    /// Routing and configuration defects, a failing action, and a returned render
    /// instruction without any view. Disallowed methods (403) and unknown actions (404)
    /// are answered through `response` and come back as
    /// [`DispatchOutcome::NoRender`].
    pub fn dispatch(
        &self,
        uri: &str,
        request: &mut dyn Request,
        response: &mut dyn ResponseSink,
        params: &Model,
    ) -> DispatchResult<DispatchOutcome> {
        let span = debug_span!("dispatch", request_id = %Uuid::new_v4(), uri);
        let _guard = span.enter();

        let route = self.parse(uri, &*request)?;

        let descriptor = self
            .controllers
            .resolve_by_uri(route.uri())
            .ok_or_else(|| DispatchError::UnknownHandler {
                uri: route.uri().to_string(),
            })?;

        let mut controller = self.objects.instance(descriptor.full_name()).ok_or_else(|| {
            DispatchError::Configuration(format!(
                "no controller instance registered for [{}]",
                descriptor.full_name()
            ))
        })?;

        self.handle(route, descriptor.as_ref(), controller.as_mut(), request, response, params)
    }

    /// Parses `uri` and fills a blank action and id from the request parameters
    fn parse(&self, uri: &str, request: &dyn Request) -> DispatchResult<ParsedRoute> {
        let mut route = parse_uri(uri)?;

        if !route.has_action() {
            if let Some(action_name) = request.parameter(&self.config.action_parameter) {
                route.set_action_name(property_name_representation(action_name));
            }
        }

        if !route.has_id() {
            if let Some(id) = request.parameter(&self.config.id_parameter) {
                route.id = id.to_string();
            }
        }

        debug!(
            controller = %route.controller_name,
            action = %route.action_name,
            id = %route.id,
            "Processing request"
        );
        trace!(extra_params = ?route.extra_params, "Extra params from uri");

        Ok(route)
    }

    fn handle(
        &self,
        mut route: ParsedRoute,
        descriptor: &dyn HandlerDescriptor,
        controller: &mut dyn Controller,
        request: &mut dyn Request,
        response: &mut dyn ResponseSink,
        params: &Model,
    ) -> DispatchResult<DispatchOutcome> {
        let controller_name = descriptor.logical_name();

        // Method policy applies to the action as parsed, before any default lookup
        if !descriptor.is_http_method_allowed(&*controller, request.method(), &route.action_name) {
            warn!(
                method = %request.method(),
                controller = %controller_name,
                action = %route.action_name,
                "HTTP method not allowed for action"
            );
            return send_status(response, StatusCode::FORBIDDEN, NoRenderReason::Forbidden);
        }

        let scaffolder = self.scaffolder(descriptor)?;

        // Declared spelling, or the default action for a bare controller URI
        if let Some(action_name) = descriptor.action_name_for_uri(route.uri()) {
            route.action_name = action_name;
        }

        let scaffold_supported = scaffolder
            .as_ref()
            .is_some_and(|scaffolder| scaffolder.supports_action(&route.action_name));
        if !route.has_action() && !scaffold_supported {
            return Err(DispatchError::NoActionForUri {
                uri: route.uri().to_string(),
                controller: descriptor.full_name().to_string(),
            });
        }

        let action_name = route.action_name.clone();

        let flash = self.flash.flash_scope(&*request);
        let chain_model = {
            let mut scope = flash.lock();
            scope.next();
            self.chain_model(&scope).unwrap_or_default()
        };

        let mut action_params: Model = request.parameters().into_iter().collect();
        if route.has_id() {
            action_params.insert(self.config.id_parameter.clone(), route.id.clone());
        }
        action_params.extend(route.extra_params.clone());

        let view_name = descriptor.view_for_uri(route.uri()).unwrap_or_default();

        let mut ctx = ActionContext::new(request, response, flash.clone())
            .with_chain_model_key(self.config.chain_model_key.clone());
        ctx.controller_uri = format!("/{}", controller_name);
        ctx.action_uri = format!("/{}/{}", controller_name, action_name);
        ctx.controller_name = controller_name;
        ctx.action_name = action_name.clone();
        ctx.params = action_params;
        ctx.properties = controller.properties();
        ctx.chain_model = chain_model;

        if descriptor.is_intercepted_before(&*controller, &action_name) {
            if let Some(interceptor) = descriptor.before_interceptor(&*controller) {
                if let Some(Value::Bool(false)) = interceptor(&mut ctx) {
                    debug!(action = %action_name, "Before interceptor vetoed the action");
                    return Ok(DispatchOutcome::NoRender(NoRenderReason::Vetoed));
                }
            }
        }

        ctx.params
            .extend(params.iter().map(|(key, value)| (key.clone(), value.clone())));

        let returned = match controller.invoke_action(&action_name, &mut ctx) {
            Some(result) => result
                .map_err(|source| DispatchError::action(&ctx.controller_name, &action_name, source))?,
            None if descriptor.is_scaffolding() => {
                return Err(DispatchError::Configuration(format!(
                    "scaffolder supports action [{}] for controller [{}] but the controller does not define it",
                    action_name,
                    descriptor.full_name()
                )));
            }
            None => {
                warn!(
                    controller = %ctx.controller_name,
                    action = %action_name,
                    "No such action"
                );
                return send_status(ctx.response_mut(), StatusCode::NOT_FOUND, NoRenderReason::NotFound);
            }
        };

        let errors = ctx.errors.to_value();
        ctx.request_mut()
            .set_attribute(&self.config.errors_attribute, errors);

        if let Some(chained) = self.chain_model(&flash.lock()) {
            ctx.chain_model = chained;
        }

        if ctx.response().is_redirected() {
            debug!(action = %action_name, "Action redirected");
            return Ok(DispatchOutcome::NoRender(NoRenderReason::Redirected));
        }

        let outcome = reduce_action_return(&mut ctx, returned, &view_name)?;

        if descriptor.is_intercepted_after(&*controller, &action_name) {
            if let Some(interceptor) = descriptor.after_interceptor(&*controller) {
                let empty = Model::new();
                let model = outcome.model_and_view().map_or(&empty, ModelAndView::model);
                interceptor(model);
            }
        }

        Ok(outcome)
    }

    fn scaffolder(&self, descriptor: &dyn HandlerDescriptor) -> DispatchResult<Option<Arc<dyn Scaffolder>>> {
        if !descriptor.is_scaffolding() {
            return Ok(None);
        }

        self.objects
            .scaffolder(descriptor.full_name())
            .map(Some)
            .ok_or_else(|| {
                DispatchError::Configuration(format!(
                    "scaffolding set to true for controller [{}] but no scaffolder available",
                    descriptor.full_name()
                ))
            })
    }

    fn chain_model(&self, scope: &FlashScope) -> Option<Model> {
        scope
            .get(&self.config.chain_model_key)
            .map(|value| Model::from_value(value).unwrap_or_default())
    }
}

fn send_status(
    response: &mut dyn ResponseSink,
    status: StatusCode,
    reason: NoRenderReason,
) -> DispatchResult<DispatchOutcome> {
    response
        .send_error(status)
        .map_err(|source| DispatchError::HandlerExecution { status, source })?;
    Ok(DispatchOutcome::NoRender(reason))
}
