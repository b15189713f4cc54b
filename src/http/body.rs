//! Request body reading
//!
//! Bodies are size-checked twice: by the declared `Content-Length` before any
//! byte is read, and by a `Limited` wrapper for chunked uploads.

use http_body_util::{BodyExt, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::CONTENT_LENGTH;
use hyper::HeaderMap;

use crate::error::ApiError;
use crate::logger;

/// Reject a request whose declared length exceeds `max_body_size`
pub fn check_content_length(headers: &HeaderMap, max_body_size: u64) -> Result<(), ApiError> {
    let Some(content_length) = headers.get(CONTENT_LENGTH) else {
        return Ok(());
    };
    match content_length.to_str().ok().and_then(|s| s.parse::<u64>().ok()) {
        Some(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Err(ApiError::PayloadTooLarge {
                limit: max_body_size,
            })
        }
        Some(_) => Ok(()),
        None => Err(ApiError::BadRequest("Invalid Content-Length header".into())),
    }
}

/// Collect a whole request body, enforcing `max_body_size`
pub async fn read_body<B>(body: B, max_body_size: u64) -> Result<Bytes, ApiError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<http_body_util::LengthLimitError>() => Err(ApiError::PayloadTooLarge {
            limit: max_body_size,
        }),
        Err(e) => Err(ApiError::BadRequest(format!(
            "Failed to read request body: {e}"
        ))),
    }
}
