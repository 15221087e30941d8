// Quill - request routing and action dispatch for Rust MVC controllers
// Parses request URIs, resolves controller actions and decides what to render

pub mod config;
pub mod controller;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod flash;
pub mod model;
pub mod naming;
pub mod registry;
pub mod request_context;
pub mod response;
pub mod value;

// Re-export the router crate
pub use quill_router;
pub use quill_router::{parse_uri, ParsedRoute, RouteError, Router, UrlPattern};

// Re-export framework types
pub use config::{Config, DispatchConfig, LoggingConfig, RoutingConfig};
pub use controller::{ActionContext, ActionReturn, ActionTable, Controller, Errors};
pub use descriptor::{
    AfterInterceptor, BeforeInterceptor, ControllerClass, HandlerDescriptor, InterceptScope,
    Scaffolder,
};
pub use dispatch::{DispatchEngine, DispatchOutcome, NoRenderReason};
pub use error::{DispatchError, DispatchResult};
pub use flash::{FlashHandle, FlashScope, FlashStore, MemoryFlashStore};
pub use model::{Model, ModelAndView, View};
pub use registry::{ControllerRegistry, ControllerTable, InstanceRegistry, ObjectRegistry};
pub use request_context::{FormData, HttpRequest, QueryParams, Request};
pub use response::{BufferedResponse, ResponseSink};
pub use value::Value;

// Re-export commonly used types from dependencies
pub use axum;
pub use axum::http::{Method, StatusCode};
