// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::time::Duration;

use crate::outbound::HeaderMergeRule;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub health: HealthConfig,
    pub dns: DnsConfig,
    pub relay: RelayConfig,
    pub outbound: OutboundConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Listen backlog passed to `listen(2)`
    pub backlog: i32,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
    /// Seconds to wait for in-flight connections after a shutdown signal
    pub shutdown_grace_secs: u64,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    /// Maximum inbound request body, in bytes
    pub max_body_size: u64,
}

/// Paths the three handlers are mounted on
#[derive(Debug, Deserialize, Clone)]
pub struct EndpointsConfig {
    pub dns: String,
    pub client_info: String,
    pub relay: String,
}

/// Health check configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HealthConfig {
    /// Enable health check endpoints
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    /// Liveness probe path (default: /healthz)
    #[serde(default = "default_healthz_path")]
    pub liveness_path: String,
    /// Readiness probe path (default: /readyz)
    #[serde(default = "default_readyz_path")]
    pub readiness_path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_enabled() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_healthz_path() -> String {
    "/healthz".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_readyz_path() -> String {
    "/readyz".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            liveness_path: default_healthz_path(),
            readiness_path: default_readyz_path(),
        }
    }
}

/// DNS-over-HTTPS resolver settings
#[derive(Debug, Deserialize, Clone)]
pub struct DnsConfig {
    /// JSON-capable DoH endpoint, queried as `?name=..&type=..`
    pub resolver_url: String,
    pub timeout_ms: u64,
    pub max_response_bytes: usize,
}

impl DnsConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// CORS relay settings
#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    pub timeout_ms: u64,
    pub max_response_bytes: usize,
    pub max_redirects: usize,
    pub header_merge: HeaderMergeRule,
}

impl RelayConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Settings shared by every outbound call
#[derive(Debug, Deserialize, Clone)]
pub struct OutboundConfig {
    pub connect_timeout_ms: u64,
}

impl OutboundConfig {
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
