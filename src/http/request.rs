//! Runtime-independent request value
//!
//! Handlers receive a fully buffered [`HandlerRequest`] rather than a hyper
//! request, so they can be driven directly from tests.

use hyper::body::Bytes;
use hyper::header::{AsHeaderName, HeaderMap};
use hyper::Method;
use std::net::SocketAddr;

/// One inbound request, buffered and detached from the connection
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    pub method: Method,
    pub path: String,
    /// Raw query string, without the leading `?`
    pub query: Option<String>,
    pub headers: HeaderMap,
    /// Peer address of the TCP connection, when known
    pub remote_addr: Option<SocketAddr>,
    pub body: Bytes,
}

impl HandlerRequest {
    pub fn new(method: Method, path_and_query: &str) -> Self {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (path_and_query.to_string(), None),
        };
        Self {
            method,
            path,
            query,
            headers: HeaderMap::new(),
            remote_addr: None,
            body: Bytes::new(),
        }
    }

    /// First value of a query parameter, percent-decoded
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Header value as text; non-visible-ASCII values are treated as absent
    pub fn header_str<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::USER_AGENT;

    #[test]
    fn test_split_path_and_query() {
        let req = HandlerRequest::new(Method::GET, "/api/dns?domain=example.com&type=A");
        assert_eq!(req.path, "/api/dns");
        assert_eq!(req.query.as_deref(), Some("domain=example.com&type=A"));

        let req = HandlerRequest::new(Method::GET, "/api/ip");
        assert_eq!(req.path, "/api/ip");
        assert!(req.query.is_none());
    }

    #[test]
    fn test_query_param_decoding() {
        let req = HandlerRequest::new(Method::GET, "/q?domain=b%C3%BCcher.example&type=MX&type=A");
        assert_eq!(req.query_param("domain").as_deref(), Some("bücher.example"));
        assert_eq!(req.query_param("type").as_deref(), Some("MX"));
        assert_eq!(req.query_param("missing"), None);
    }

    #[test]
    fn test_header_str() {
        let mut req = HandlerRequest::new(Method::GET, "/");
        req.headers
            .insert(USER_AGENT, "curl/8.0".parse().expect("valid header"));
        assert_eq!(req.header_str(USER_AGENT), Some("curl/8.0"));
        assert_eq!(req.header_str("x-forwarded-for"), None);
    }
}
