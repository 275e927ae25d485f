//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: body size enforcement, buffering
//! into a [`HandlerRequest`], exact-path dispatch and access logging.

use crate::config::{AppState, Config};
use crate::handler::client_info;
use crate::http::{self, HandlerRequest, HandlerResponse};
use crate::logger::{self, AccessLogEntry};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, HeaderName, CONTENT_LENGTH, REFERER, USER_AGENT};
use hyper::{Request, Response, StatusCode, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Which handler a path is mounted on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Dns,
    ClientInfo,
    Relay,
    Health,
    NotFound,
}

impl Endpoint {
    /// Resolve a request path against the configured mount points
    pub fn for_path(path: &str, config: &Config) -> Self {
        let health = &config.health;
        if path == config.endpoints.dns {
            Self::Dns
        } else if path == config.endpoints.client_info {
            Self::ClientInfo
        } else if path == config.endpoints.relay {
            Self::Relay
        } else if health.enabled && (path == health.liveness_path || path == health.readiness_path)
        {
            Self::Health
        } else {
            Self::NotFound
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Dns => "dns",
            Self::ClientInfo => "client_info",
            Self::Relay => "relay",
            Self::Health => "health",
            Self::NotFound => "not_found",
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let endpoint = Endpoint::for_path(parts.uri.path(), &state.config);

    let mut entry = state
        .config
        .logging
        .access_log
        .then(|| access_entry(&parts, peer_addr));

    let response = match read_body(&parts.headers, body, state.config.http.max_body_size).await {
        Ok(body) => {
            let request = HandlerRequest {
                method: parts.method,
                path: parts.uri.path().to_string(),
                query: parts.uri.query().map(ToString::to_string),
                headers: parts.headers,
                remote_addr: Some(peer_addr),
                body,
            };
            logger::log_debug(&format!(
                "{} {} -> {}",
                request.method,
                request.path,
                endpoint.name()
            ));
            dispatch(endpoint, &request, &state).await
        }
        Err(rejection) => rejection,
    };

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status.as_u16();
        entry.body_bytes = response.body.len();
        entry.endpoint = endpoint.name();
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response.into_hyper(&state.config.http.server_name))
}

/// Run the handler mounted for `endpoint`
pub async fn dispatch(
    endpoint: Endpoint,
    request: &HandlerRequest,
    state: &AppState,
) -> HandlerResponse {
    match endpoint {
        Endpoint::Dns => state.dns.handle(request).await,
        Endpoint::ClientInfo => client_info::handle(request),
        Endpoint::Relay => state.relay.handle(request).await,
        Endpoint::Health => http::build_health_response(),
        Endpoint::NotFound => http::build_404_response(),
    }
}

/// Buffer the request body, enforcing `max_body_size`
async fn read_body<B>(
    headers: &HeaderMap,
    body: B,
    max_body_size: u64,
) -> Result<Bytes, HandlerResponse>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if let Some(resp) = check_body_size(headers, max_body_size) {
        return Err(resp);
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!(
                "Request body exceeded {max_body_size} bytes while reading"
            ));
            Err(http::build_413_response(max_body_size))
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(HandlerResponse::error(
                StatusCode::BAD_REQUEST,
                "Failed to read request body",
            ))
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<HandlerResponse> {
    let content_length = headers.get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response(max_body_size))
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', relying on streamed limit"
                ));
                None
            }
            _ => None,
        },
    )
}

fn access_entry(parts: &hyper::http::request::Parts, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: HeaderName| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = version_label(parts.version).to_string();
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
