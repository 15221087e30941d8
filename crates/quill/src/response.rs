// File: src/response.rs
// Purpose: Response sink boundary used for soft errors and redirects

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use std::io;

/// Where dispatch writes status-only responses
///
/// The transport layer owns the real response; dispatch only needs to emit an error
/// status, issue redirects and ask whether one was issued.
pub trait ResponseSink {
    fn send_error(&mut self, status: StatusCode) -> io::Result<()>;

    fn send_redirect(&mut self, location: &str) -> io::Result<()>;

    fn is_redirected(&self) -> bool;
}

/// In-memory response that records what dispatch asked for
#[derive(Debug, Clone, Default)]
pub struct BufferedResponse {
    status: Option<StatusCode>,
    location: Option<String>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status sent via [`ResponseSink::send_error`], if any
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Redirect target, if a redirect was issued
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    fn ensure_uncommitted(&self) -> io::Result<()> {
        if self.status.is_some() || self.location.is_some() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "response has already been committed",
            ));
        }
        Ok(())
    }
}

impl ResponseSink for BufferedResponse {
    fn send_error(&mut self, status: StatusCode) -> io::Result<()> {
        self.ensure_uncommitted()?;
        self.status = Some(status);
        Ok(())
    }

    fn send_redirect(&mut self, location: &str) -> io::Result<()> {
        self.ensure_uncommitted()?;
        self.location = Some(location.to_string());
        Ok(())
    }

    fn is_redirected(&self) -> bool {
        self.location.is_some()
    }
}

impl IntoResponse for BufferedResponse {
    fn into_response(self) -> Response {
        if let Some(location) = self.location {
            let mut response = StatusCode::FOUND.into_response();
            if let Ok(value) = HeaderValue::from_str(&location) {
                response.headers_mut().insert(header::LOCATION, value);
            }
            return response;
        }

        self.status.unwrap_or(StatusCode::OK).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_error_records_status() {
        let mut response = BufferedResponse::new();
        response.send_error(StatusCode::NOT_FOUND).unwrap();
        assert_eq!(response.status(), Some(StatusCode::NOT_FOUND));
        assert!(!response.is_redirected());
    }

    #[test]
    fn test_second_write_fails() {
        let mut response = BufferedResponse::new();
        response.send_redirect("/book/list").unwrap();
        assert!(response.is_redirected());
        assert!(response.send_error(StatusCode::FORBIDDEN).is_err());
    }

    #[test]
    fn test_into_response_redirect() {
        let mut buffered = BufferedResponse::new();
        buffered.send_redirect("/book/list").unwrap();

        let response = buffered.into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/book/list"
        );
    }

    #[test]
    fn test_into_response_error_status() {
        let mut buffered = BufferedResponse::new();
        buffered.send_error(StatusCode::FORBIDDEN).unwrap();
        assert_eq!(buffered.into_response().status(), StatusCode::FORBIDDEN);
    }
}
