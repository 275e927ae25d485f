//! Generic CORS relay
//!
//! A browser POSTs a description of the request it wants made; the relay
//! performs it server-side and answers with the target's status, headers and
//! body wrapped in JSON. The outer response is `200` whenever the target
//! answered at all, even if the target's own status is an error.

use hyper::header::{HeaderName, HeaderValue, ALLOW};
use hyper::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use url::Url;

use crate::config::RelayConfig;
use crate::error::HandlerError;
use crate::http::{HandlerRequest, HandlerResponse};
use crate::outbound::{self, HeaderMergeRule};

const SERVICE: &str = "Relay target";

/// Request description sent by the caller
#[derive(Debug, Deserialize)]
pub struct RelayRequest {
    pub url: Option<String>,
    pub method: Option<String>,
    pub headers: Option<HashMap<String, String>>,
    /// Strings are sent verbatim, other JSON values as their JSON text
    pub body: Option<serde_json::Value>,
}

/// Target response as returned to the caller
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayResult {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub struct CorsRelay {
    client: reqwest::Client,
    timeout: Duration,
    max_response_bytes: usize,
    header_merge: HeaderMergeRule,
}

impl CorsRelay {
    pub fn new(client: reqwest::Client, config: &RelayConfig) -> Self {
        Self {
            client,
            timeout: config.timeout(),
            max_response_bytes: config.max_response_bytes,
            header_merge: config.header_merge,
        }
    }

    pub async fn handle(&self, req: &HandlerRequest) -> HandlerResponse {
        if req.method != Method::POST {
            return HandlerResponse::empty(StatusCode::METHOD_NOT_ALLOWED).with_header(ALLOW, "POST");
        }

        match self.relay(&req.body).await {
            Ok(result) => HandlerResponse::json(StatusCode::OK, &result),
            Err(err) => HandlerResponse::from_error(&err),
        }
    }

    async fn relay(&self, payload: &[u8]) -> Result<RelayResult, HandlerError> {
        // Arrays would otherwise satisfy the derived struct visitor
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(payload)?;
        let request: RelayRequest = serde_json::from_value(serde_json::Value::Object(object))?;
        let builder = self.prepare(request)?;

        let response = outbound::send(builder, SERVICE, self.timeout).await?;
        let status = response.status();
        let headers = outbound::flatten_headers(response.headers(), self.header_merge);
        let body =
            outbound::read_body_limited(response, self.max_response_bytes, SERVICE, self.timeout)
                .await?;

        Ok(RelayResult {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    /// Validate the description and turn it into an outbound request
    fn prepare(&self, request: RelayRequest) -> Result<reqwest::RequestBuilder, HandlerError> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        let (Some(target), Some(method)) = (non_empty(request.url), non_empty(request.method))
        else {
            return Err(HandlerError::Validation(
                "Missing required fields: url and method",
            ));
        };

        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|_| HandlerError::InvalidMethod(method.clone()))?;
        let url = parse_target(&target)?;

        let mut builder = self.client.request(method, url);
        for (name, value) in request.headers.unwrap_or_default() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| HandlerError::InvalidHeader(name.clone()))?;
            let header_value =
                HeaderValue::from_str(&value).map_err(|_| HandlerError::InvalidHeader(name))?;
            builder = builder.header(header_name, header_value);
        }

        match request.body {
            Some(serde_json::Value::String(text)) => Ok(builder.body(text)),
            Some(other) => Ok(builder.body(other.to_string())),
            None => Ok(builder),
        }
    }
}

fn parse_target(target: &str) -> Result<Url, HandlerError> {
    let invalid = |reason: String| HandlerError::InvalidUrl {
        url: target.to_string(),
        reason,
    };
    let url = Url::parse(target).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{other}'"))),
    }
}
