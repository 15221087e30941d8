/// Errors raised while compiling URL patterns or parsing request URIs

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The declared pattern is blank or does not start with `/`
    #[error("invalid URL pattern [{pattern}]: {reason}")]
    InvalidPattern { pattern: String, reason: &'static str },

    /// The request URI handed to the parser was absent
    #[error("controller URI cannot be empty")]
    InvalidArgument,
}

impl RouteError {
    pub(crate) fn invalid_pattern(pattern: &str, reason: &'static str) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        }
    }
}

pub type RouteResult<T> = Result<T, RouteError>;
