//! HTTP response building module
//!
//! Handlers produce a [`HandlerResponse`]; the server converts it into a hyper
//! response at the connection boundary. Every JSON response carries a
//! permissive `Access-Control-Allow-Origin` header.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, SERVER,
};
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::error::HandlerError;
use crate::logger;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Handler output, independent of the hosting runtime
#[derive(Debug, Clone)]
pub struct HandlerResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HandlerResponse {
    /// Response with no body and only the CORS header
    pub fn empty(status: StatusCode) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        Self {
            status,
            headers,
            body: Bytes::new(),
        }
    }

    /// Already-encoded JSON body, sent byte for byte
    pub fn raw_json(status: StatusCode, body: Bytes) -> Self {
        let mut response = Self::empty(status);
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        response.body = body;
        response
    }

    /// Serialize `value` as the JSON body
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self::raw_json(status, Bytes::from(body)),
            Err(e) => {
                logger::log_error(&format!("Failed to serialize response: {e}"));
                Self::raw_json(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Bytes::from_static(br#"{"error":"Internal server error"}"#),
                )
            }
        }
    }

    /// `{"error": message}` with the given status
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::json(status, &serde_json::json!({ "error": message }))
    }

    pub fn from_error(err: &HandlerError) -> Self {
        Self::error(err.status(), &err.to_string())
    }

    /// Plain-text body
    pub fn text(status: StatusCode, body: &'static str) -> Self {
        let mut response = Self::empty(status);
        response.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response.body = Bytes::from_static(body.as_bytes());
        response
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: &'static str) -> Self {
        self.headers.insert(name, HeaderValue::from_static(value));
        self
    }

    /// Convert into a hyper response, stamping the `Server` header
    pub fn into_hyper(self, server_name: &str) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        match HeaderValue::from_str(server_name) {
            Ok(value) => {
                response.headers_mut().insert(SERVER, value);
            }
            Err(e) => logger::log_warning(&format!("Invalid server name '{server_name}': {e}")),
        }
        response
    }
}

/// Build 404 Not Found response
pub fn build_404_response() -> HandlerResponse {
    HandlerResponse::error(StatusCode::NOT_FOUND, "Not Found")
}

/// Build 413 Payload Too Large response
pub fn build_413_response(max_body_size: u64) -> HandlerResponse {
    HandlerResponse::error(
        StatusCode::PAYLOAD_TOO_LARGE,
        &format!("Request body exceeds {max_body_size} bytes"),
    )
}

/// Build health check response
pub fn build_health_response() -> HandlerResponse {
    HandlerResponse::text(StatusCode::OK, "ok")
        .with_header(hyper::header::CACHE_CONTROL, "no-cache")
}
