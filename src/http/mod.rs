//! HTTP protocol layer module
//!
//! JSON response building and request body reading, decoupled from the widget handlers.

pub mod body;
pub mod response;

// Re-export commonly used types
pub use body::read_body;
pub use response::{error_response, json_response};
