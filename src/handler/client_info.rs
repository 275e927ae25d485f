//! Client info echo
//!
//! Reports the caller's originating address and user agent. Never fails:
//! missing data is replaced by fixed placeholders.

use hyper::header::{HeaderName, CACHE_CONTROL, EXPIRES, PRAGMA, USER_AGENT};
use hyper::StatusCode;
use serde::Serialize;

use crate::http::{HandlerRequest, HandlerResponse};

pub const IP_PLACEHOLDER: &str = "not found";
pub const USER_AGENT_PLACEHOLDER: &str = "unknown";

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const SURROGATE_CONTROL: &str = "surrogate-control";

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub ip: String,
    pub user_agent: String,
}

impl ClientInfo {
    pub fn from_request(req: &HandlerRequest) -> Self {
        let forwarded = req
            .header_str(X_FORWARDED_FOR)
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let ip = match (forwarded, req.remote_addr) {
            (Some(addr), _) => addr.to_string(),
            (None, Some(peer)) => peer.ip().to_string(),
            (None, None) => IP_PLACEHOLDER.to_string(),
        };

        let user_agent = req
            .headers
            .get(USER_AGENT)
            .map_or_else(
                || USER_AGENT_PLACEHOLDER.to_string(),
                |v| String::from_utf8_lossy(v.as_bytes()).into_owned(),
            );

        Self { ip, user_agent }
    }
}

pub fn handle(req: &HandlerRequest) -> HandlerResponse {
    HandlerResponse::json(StatusCode::OK, &ClientInfo::from_request(req))
        .with_header(
            CACHE_CONTROL,
            "no-store, no-cache, must-revalidate, proxy-revalidate",
        )
        .with_header(PRAGMA, "no-cache")
        .with_header(EXPIRES, "0")
        .with_header(HeaderName::from_static(SURROGATE_CONTROL), "no-store")
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::ACCESS_CONTROL_ALLOW_ORIGIN;
    use hyper::Method;

    fn request() -> HandlerRequest {
        HandlerRequest::new(Method::GET, "/api/ip")
    }

    fn with_header(mut req: HandlerRequest, name: &'static str, value: &'static str) -> HandlerRequest {
        req.headers
            .insert(name, hyper::header::HeaderValue::from_static(value));
        req
    }

    #[test]
    fn test_forwarded_for_first_entry_wins() {
        let mut req = with_header(request(), X_FORWARDED_FOR, " 203.0.113.7 , 10.0.0.1, 10.0.0.2");
        req.remote_addr = Some("192.0.2.1:5555".parse().expect("addr"));
        assert_eq!(ClientInfo::from_request(&req).ip, "203.0.113.7");
    }

    #[test]
    fn test_falls_back_to_peer_address_without_port() {
        let mut req = request();
        req.remote_addr = Some("[2001:db8::1]:443".parse().expect("addr"));
        assert_eq!(ClientInfo::from_request(&req).ip, "2001:db8::1");

        let mut req = with_header(request(), X_FORWARDED_FOR, " , 10.0.0.1");
        req.remote_addr = Some("192.0.2.1:5555".parse().expect("addr"));
        assert_eq!(ClientInfo::from_request(&req).ip, "192.0.2.1");
    }

    #[test]
    fn test_placeholders_when_nothing_known() {
        let info = ClientInfo::from_request(&request());
        assert_eq!(
            info,
            ClientInfo {
                ip: IP_PLACEHOLDER.to_string(),
                user_agent: USER_AGENT_PLACEHOLDER.to_string(),
            }
        );
    }

    #[test]
    fn test_response_shape_and_headers() {
        let req = with_header(request(), "user-agent", "Mozilla/5.0 (X11)");
        let resp = handle(&req);

        assert_eq!(resp.status, StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&resp.body).expect("json body");
        assert_eq!(
            body,
            serde_json::json!({ "ip": IP_PLACEHOLDER, "userAgent": "Mozilla/5.0 (X11)" })
        );
        assert_eq!(resp.headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(resp.headers[CACHE_CONTROL]
            .to_str()
            .unwrap_or_default()
            .contains("no-store"));
        assert_eq!(resp.headers[PRAGMA], "no-cache");
        assert_eq!(resp.headers[EXPIRES], "0");
    }

    #[test]
    fn test_any_method_is_answered() {
        for method in [Method::POST, Method::DELETE, Method::OPTIONS] {
            let resp = handle(&HandlerRequest::new(method, "/api/ip"));
            assert_eq!(resp.status, StatusCode::OK);
        }
    }
}
