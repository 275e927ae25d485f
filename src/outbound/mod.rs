//! Outbound HTTP module
//!
//! Everything the relaying handlers need to talk to an upstream: the shared
//! client, timed sends, bounded body reads and header flattening.

mod body;
mod client;
mod headers;

pub use body::read_body_limited;
pub use client::{build_client, send};
pub use headers::{flatten_headers, HeaderMergeRule};
