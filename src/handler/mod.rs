//! Request handler module
//!
//! The three endpoint handlers and the router that dispatches to them.

pub mod client_info;
pub mod dns;
pub mod relay;
pub mod router;

// Re-export main entry point
pub use dns::DnsRelay;
pub use relay::CorsRelay;
pub use router::handle_request;
