//! HTTP-visible errors.

use http::StatusCode;
use thiserror::Error;

/// An error carrying a status code and a client-safe message.
///
/// Handlers return this to control the response status; the dispatcher
/// encodes it as an `{"error": message}` JSON body. An empty message falls
/// back to the status's canonical reason phrase.
#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.is_empty() {
            message = status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string();
        }
        HttpError { status, message }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, "")
    }

    /// Masks the underlying cause from the client; log it at the call site.
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }
}
