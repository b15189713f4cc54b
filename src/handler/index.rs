//! Root endpoint: a liveness check that also reports the running version

use chrono::Local;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::http;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
struct IndexPayload {
    timestamp: String,
    version: &'static str,
}

pub fn index() -> Response<Full<Bytes>> {
    let payload = IndexPayload {
        timestamp: Local::now().to_rfc3339(),
        version: VERSION,
    };
    http::json_response(StatusCode::OK, &payload)
}
