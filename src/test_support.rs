//! Shared helpers for handler tests: a throwaway loopback HTTP server that
//! plays the resolver or relay target, and a config with short timeouts.

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderName};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Response, StatusCode, Uri};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::config::Config;

/// What the stub upstream saw
pub struct StubRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// What the stub upstream answers
pub struct StubResponse {
    status: u16,
    headers: Vec<(&'static str, String)>,
    body: Bytes,
    delay: Option<Duration>,
}

impl StubResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self::text(status, body).with_header("content-type", "application/json")
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Bytes::from(body.to_string()),
            delay: None,
        }
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// Start a stub upstream on `127.0.0.1:0`; returns its base URL without a
/// trailing slash. The server lives until the test's runtime shuts down.
pub async fn spawn_upstream<F>(respond: F) -> String
where
    F: Fn(StubRequest) -> StubResponse + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub upstream");
    let addr = listener.local_addr().expect("stub address");
    let respond = Arc::new(respond);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let respond = Arc::clone(&respond);
            tokio::spawn(async move {
                let service = service_fn(move |req: hyper::Request<hyper::body::Incoming>| {
                    let respond = Arc::clone(&respond);
                    async move {
                        let (parts, body) = req.into_parts();
                        let body = body.collect().await.map(|c| c.to_bytes()).unwrap_or_default();
                        let stub = respond(StubRequest {
                            method: parts.method,
                            uri: parts.uri,
                            headers: parts.headers,
                            body,
                        });
                        if let Some(delay) = stub.delay {
                            tokio::time::sleep(delay).await;
                        }
                        let mut response = Response::new(Full::new(stub.body));
                        *response.status_mut() =
                            StatusCode::from_u16(stub.status).expect("stub status");
                        for (name, value) in stub.headers {
                            response.headers_mut().append(
                                HeaderName::from_bytes(name.as_bytes()).expect("stub header name"),
                                value.parse().expect("stub header value"),
                            );
                        }
                        Ok::<_, Infallible>(response)
                    }
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    format!("http://{addr}")
}

/// Defaults with timeouts short enough for tests
pub fn test_config() -> Config {
    let mut config = Config::load_from("does-not-exist/edge-relay").expect("default config");
    config.dns.timeout_ms = 2000;
    config.relay.timeout_ms = 2000;
    config.outbound.connect_timeout_ms = 500;
    config.logging.access_log = false;
    config
}
