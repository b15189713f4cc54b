//! Error types
//!
//! `StoreError` is what the widget store reports; `ApiError` is what a
//! request handler hands back to the router, which renders it as a JSON
//! error body with the matching status code.

use hyper::StatusCode;

/// Message used for every 404, whether the id or the path is unknown
pub const NOT_FOUND_MESSAGE: &str = "The requested resource could not be located.";

/// Message used for every 405
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed for this resource.";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("widget {0} not found")]
    NotFound(String),
    #[error("widget store lock poisoned")]
    LockPoisoned,
    #[error("unable to generate widget id: {0}")]
    IdGeneration(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,
    #[error("{}", METHOD_NOT_ALLOWED_MESSAGE)]
    MethodNotAllowed { allow: &'static str },
    #[error("{0}")]
    BadRequest(String),
    #[error("Request body exceeds {limit} bytes.")]
    PayloadTooLarge { limit: u64 },
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::NotFound,
            StoreError::LockPoisoned | StoreError::IdGeneration(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(err.to_string())
    }
}
