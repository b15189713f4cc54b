//! Request handler module
//!
//! Responsible for request routing dispatch and the widget CRUD operations.

pub mod index;
pub mod router;
pub mod widgets;

// Re-export main entry point
pub use router::handle_request;
