//! Handler error type
//!
//! Every failure a handler can hit is one of these variants. The `Display`
//! text is what the caller receives in the `{"error": ...}` body, and
//! [`HandlerError::status`] decides the response code.

use hyper::StatusCode;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandlerError {
    /// A required input field was absent or empty
    #[error("{0}")]
    Validation(&'static str),

    /// The upstream answered with a non-success HTTP status
    #[error("{service} returned HTTP {status}")]
    UpstreamStatus {
        service: &'static str,
        status: u16,
    },

    /// The resolver reported a DNS RCODE other than NOERROR/NXDOMAIN
    #[error("DNS query failed with status {0}")]
    QueryFailed(u64),

    /// The upstream body was not in the expected shape
    #[error("Invalid resolver response: {0}")]
    MalformedUpstream(String),

    #[error("Invalid relay request: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    #[error("Invalid target URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("Invalid header '{0}'")]
    InvalidHeader(String),

    #[error("{service} timed out after {}ms", .after.as_millis())]
    Timeout {
        service: &'static str,
        after: Duration,
    },

    #[error("{service} response exceeds {limit} bytes")]
    BodyTooLarge { service: &'static str, limit: usize },

    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl HandlerError {
    /// HTTP status returned to the caller for this failure
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify a transport error, separating timeouts from other failures
    pub fn from_transport(service: &'static str, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                service,
                after: timeout,
            }
        } else {
            Self::Transport {
                service,
                source: err,
            }
        }
    }
}
