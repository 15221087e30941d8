// File: src/error.rs
// Purpose: Hard failures surfaced past the dispatch boundary

use axum::http::StatusCode;
use quill_router::RouteError;
use std::io;
use thiserror::Error;

/// Errors raised by [`crate::DispatchEngine::dispatch`]
///
/// Disallowed methods and unknown actions are not errors: they are answered with
/// 403/404 through the response sink and reported as a no-render outcome.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The URI was empty or could not be parsed
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("no controller found for URI [{uri}]")]
    UnknownHandler { uri: String },

    #[error("no action specified and no default action defined for URI [{uri}] in controller [{controller}]")]
    NoActionForUri { uri: String, controller: String },

    /// A deployment defect, such as a scaffolded controller without a scaffolder
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("action [{action}] of controller [{controller}] returned a view without a view name")]
    MissingViewName { controller: String, action: String },

    /// Writing the soft error response failed
    #[error("unable to send {status} response")]
    HandlerExecution {
        status: StatusCode,
        #[source]
        source: io::Error,
    },

    /// The action itself failed
    #[error("action [{action}] of controller [{controller}] failed")]
    Action {
        controller: String,
        action: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl DispatchError {
    pub(crate) fn action(
        controller: &str,
        action: &str,
        source: anyhow::Error,
    ) -> Self {
        Self::Action {
            controller: controller.to_string(),
            action: action.to_string(),
            source: source.into(),
        }
    }

    /// HTTP status a transport layer should answer with
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Route(RouteError::InvalidArgument) => StatusCode::BAD_REQUEST,
            Self::UnknownHandler { .. } | Self::NoActionForUri { .. } => StatusCode::NOT_FOUND,
            Self::Route(_)
            | Self::Configuration(_)
            | Self::MissingViewName { .. }
            | Self::HandlerExecution { .. }
            | Self::Action { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type DispatchResult<T> = Result<T, DispatchError>;
