// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, DnsConfig, EndpointsConfig, HealthConfig, HttpConfig, LoggingConfig, OutboundConfig,
    PerformanceConfig, RelayConfig, ServerConfig,
};

/// Prefix for environment overrides, e.g. `EDGE_RELAY__TIMEOUT_MS=3000`
const ENV_PREFIX: &str = "EDGE";

impl Config {
    /// Load configuration from specified file path (extension optional)
    ///
    /// The file is not required; missing keys fall back to built-in defaults
    /// and `EDGE_<SECTION>__<KEY>` environment variables override both.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.backlog", 1024)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_grace_secs", 10)?
            .set_default(
                "http.server_name",
                concat!("edge-relay/", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("endpoints.dns", "/api/dns")?
            .set_default("endpoints.client_info", "/api/ip")?
            .set_default("endpoints.relay", "/api/proxy")?
            .set_default("dns.resolver_url", "https://cloudflare-dns.com/dns-query")?
            .set_default("dns.timeout_ms", 5000)?
            .set_default("dns.max_response_bytes", 1_048_576)?
            .set_default("relay.timeout_ms", 10_000)?
            .set_default("relay.max_response_bytes", 10_485_760)? // 10MB
            .set_default("relay.max_redirects", 10)?
            .set_default("relay.header_merge", "join")?
            .set_default("outbound.connect_timeout_ms", 3000)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
