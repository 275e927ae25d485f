//! DNS lookup relay
//!
//! Forwards `?domain=..&type=..` to a JSON DNS-over-HTTPS resolver and maps the
//! resolver's `Status` (DNS RCODE) onto an HTTP response:
//!
//! | resolver outcome          | response                         |
//! |---------------------------|----------------------------------|
//! | `Status: 0` (NOERROR)     | `200`, resolver body unchanged   |
//! | `Status: 3` (NXDOMAIN)    | `200`, `{"Answer": []}`          |
//! | any other `Status`        | `500`, `{"error": ...}`          |
//! | HTTP error / no response  | `500`, `{"error": ...}`          |

use hyper::header::ACCEPT;
use hyper::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::config::DnsConfig;
use crate::error::HandlerError;
use crate::http::{HandlerRequest, HandlerResponse};
use crate::outbound;

const SERVICE: &str = "DNS resolver";
const DNS_JSON: &str = "application/dns-json";

const RCODE_NOERROR: u64 = 0;
const RCODE_NXDOMAIN: u64 = 3;

/// Query parameters of a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub domain: String,
    pub record_type: String,
}

impl LookupRequest {
    /// Read `domain` and `type` from the query string; empty counts as absent
    pub fn from_request(req: &HandlerRequest) -> Result<Self, HandlerError> {
        let param = |name: &str| req.query_param(name).filter(|v| !v.is_empty());
        match (param("domain"), param("type")) {
            (Some(domain), Some(record_type)) => Ok(Self {
                domain,
                record_type,
            }),
            _ => Err(HandlerError::Validation(
                "Missing required parameters: domain and type",
            )),
        }
    }
}

/// The only field of the resolver body we inspect; answers stay opaque
#[derive(Deserialize)]
struct ResolverStatus {
    #[serde(rename = "Status")]
    status: Option<u64>,
}

pub struct DnsRelay {
    client: reqwest::Client,
    resolver: Url,
    timeout: Duration,
    max_response_bytes: usize,
}

impl DnsRelay {
    pub fn new(client: reqwest::Client, config: &DnsConfig) -> Result<Self, url::ParseError> {
        Ok(Self {
            client,
            resolver: Url::parse(&config.resolver_url)?,
            timeout: config.timeout(),
            max_response_bytes: config.max_response_bytes,
        })
    }

    pub async fn handle(&self, req: &HandlerRequest) -> HandlerResponse {
        match self.lookup(req).await {
            Ok(response) => response,
            Err(err) => HandlerResponse::from_error(&err),
        }
    }

    async fn lookup(&self, req: &HandlerRequest) -> Result<HandlerResponse, HandlerError> {
        let query = LookupRequest::from_request(req)?;

        let mut url = self.resolver.clone();
        url.query_pairs_mut()
            .append_pair("name", &query.domain)
            .append_pair("type", &query.record_type);

        let request = self.client.get(url).header(ACCEPT, DNS_JSON);
        let response = outbound::send(request, SERVICE, self.timeout).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HandlerError::UpstreamStatus {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let body =
            outbound::read_body_limited(response, self.max_response_bytes, SERVICE, self.timeout)
                .await?;
        let parsed: ResolverStatus = serde_json::from_slice(&body)
            .map_err(|e| HandlerError::MalformedUpstream(e.to_string()))?;

        match parsed.status {
            Some(RCODE_NOERROR) => Ok(HandlerResponse::raw_json(StatusCode::OK, body)),
            Some(RCODE_NXDOMAIN) => Ok(HandlerResponse::json(
                StatusCode::OK,
                &serde_json::json!({ "Answer": [] }),
            )),
            Some(code) => Err(HandlerError::QueryFailed(code)),
            None => Err(HandlerError::MalformedUpstream(
                "missing Status field".to_string(),
            )),
        }
    }
}
