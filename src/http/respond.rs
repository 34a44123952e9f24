//! Response shaping.
//!
//! Handlers return any type implementing [`Respond`], which turns the value
//! into the wire response. Implementations can filter or transform the
//! value before encoding, e.g. stripping fields that must not leave the
//! server. [`Bypass`] passes a serializable value through unmodified.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Response, StatusCode};
use http_body_util::Full;
use serde::Serialize;

use crate::http::error::HttpError;

/// Shapes a handler's return value into the response sent to the client.
pub trait Respond {
    fn respond(self) -> Result<Response<Full<Bytes>>, HttpError>;
}

/// Passes a serializable value through as a JSON 200 with no filtering.
pub struct Bypass<T: Serialize>(pub T);

impl<T: Serialize> Respond for Bypass<T> {
    fn respond(self) -> Result<Response<Full<Bytes>>, HttpError> {
        json_response(StatusCode::OK, &self.0)
    }
}

impl Respond for serde_json::Value {
    fn respond(self) -> Result<Response<Full<Bytes>>, HttpError> {
        json_response(StatusCode::OK, &self)
    }
}

/// Raw bytes passthrough, sent as-is with no content type.
impl Respond for Bytes {
    fn respond(self) -> Result<Response<Full<Bytes>>, HttpError> {
        Ok(Response::new(Full::new(self)))
    }
}

/// Empty 200.
impl Respond for () {
    fn respond(self) -> Result<Response<Full<Bytes>>, HttpError> {
        Ok(Response::new(Full::new(Bytes::new())))
    }
}

/// Encode a value as a JSON response with the given status.
pub fn json_response(
    status: StatusCode,
    value: &impl Serialize,
) -> Result<Response<Full<Bytes>>, HttpError> {
    let body = serde_json::to_vec(value).map_err(|err| {
        tracing::error!(error = %err, "response encoding failed");
        HttpError::internal()
    })?;
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(response)
}

/// The `{"error": message}` envelope used for every error outcome.
pub(crate) fn error_response(err: &HttpError) -> Response<Full<Bytes>> {
    #[derive(Serialize)]
    struct ErrorBody<'a> {
        error: &'a str,
    }

    let body = serde_json::to_vec(&ErrorBody {
        error: err.message(),
    })
    .unwrap_or_else(|_| br#"{"error":"internal server error"}"#.to_vec());
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = err.status();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
