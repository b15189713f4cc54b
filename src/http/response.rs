//! HTTP response building module
//!
//! Every response this server sends is JSON. Errors share one shape: `{"error": "<message>"}`.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::error::ApiError;

const APPLICATION_JSON: &str = "application/json";

/// Serialize `body` and wrap it in a response with the given status
///
/// A serialization failure turns into a 500 with the standard error shape.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => build(status, Bytes::from(json)),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            error_response(&ApiError::Internal(e.to_string()))
        }
    }
}

/// Render an `ApiError` as `{"error": message}` with its status code
pub fn error_response(err: &ApiError) -> Response<Full<Bytes>> {
    let body = serde_json::json!({ "error": err.to_string() });
    let mut response = build(err.status(), Bytes::from(body.to_string()));
    if let ApiError::MethodNotAllowed { allow } = err {
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static(allow));
    }
    response
}

fn build(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, APPLICATION_JSON)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            Response::new(Full::new(Bytes::from(r#"{"error":"Internal server error"}"#)))
        })
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
