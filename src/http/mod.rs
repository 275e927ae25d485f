//! HTTP protocol layer module
//!
//! Request and response values shared by all handlers, decoupled from hyper's
//! streaming types.

pub mod request;
pub mod response;

// Re-export commonly used types
pub use request::HandlerRequest;
pub use response::{build_404_response, build_413_response, build_health_response, HandlerResponse};
