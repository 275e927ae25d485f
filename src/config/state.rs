// Application state module
// Owns the outbound client and the handlers built from configuration

use super::types::Config;
use crate::handler::{CorsRelay, DnsRelay};
use crate::outbound;

/// Application state
///
/// Built once at startup and shared read-only by every connection.
pub struct AppState {
    pub config: Config,
    pub dns: DnsRelay,
    pub relay: CorsRelay,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let client = outbound::build_client(config)?;
        let dns = DnsRelay::new(client.clone(), &config.dns)?;
        let relay = CorsRelay::new(client, &config.relay);

        Ok(Self {
            config: config.clone(),
            dns,
            relay,
        })
    }
}
