// Outbound HTTP client
// One pooled client is built at startup and shared by both relaying handlers

use reqwest::redirect::Policy;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::HandlerError;
use crate::logger;

/// Build the shared outbound client.
///
/// Redirects are followed by the client itself, so callers only ever see the
/// final hop. System proxy settings are ignored.
pub fn build_client(config: &Config) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .use_rustls_tls()
        .connect_timeout(config.outbound.connect_timeout())
        .redirect(Policy::limited(config.relay.max_redirects))
        .user_agent(config.http.server_name.clone())
        .no_proxy()
        .build()
}

/// Send a prepared request with a per-request timeout, logging the outcome.
///
/// `service` names the upstream in log lines and error messages.
pub async fn send(
    request: reqwest::RequestBuilder,
    service: &'static str,
    timeout: Duration,
) -> Result<reqwest::Response, HandlerError> {
    let started = Instant::now();
    match request.timeout(timeout).send().await {
        Ok(response) => {
            logger::log_upstream(
                service,
                response.url().as_str(),
                response.status().as_u16(),
                started.elapsed(),
            );
            Ok(response)
        }
        Err(e) => {
            let err = HandlerError::from_transport(service, timeout, e);
            logger::log_warning(&format!("{err} ({}ms)", started.elapsed().as_millis()));
            Err(err)
        }
    }
}
