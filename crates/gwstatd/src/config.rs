//! Environment-sourced daemon configuration

use std::net::SocketAddr;

use anyhow::Context;

/// Default network server when `GWSTAT_SERVER` is unset
const DEFAULT_SERVER: &str = "https://eu1.cloud.thethings.network";

/// Default listen address for the metrics endpoint
const DEFAULT_LISTEN: &str = "0.0.0.0:2113";

/// Daemon configuration.
///
/// All values come from the process environment:
/// - `GWSTAT_APIKEY`: API key for the network server (required)
/// - `GWSTAT_SERVER`: server base URL (default: eu1 cloud cluster)
/// - `GWSTAT_GATEWAYS`: comma-separated gateway ids; unset means
///   discover all gateways visible to the API key at startup
/// - `GWSTAT_LISTEN`: metrics listen address (default: 0.0.0.0:2113)
#[derive(Debug, Clone)]
pub struct Config {
    pub server: String,
    pub api_key: String,
    /// Explicit gateway set; empty means discover at startup
    pub gateway_ids: Vec<String>,
    pub listen: SocketAddr,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key =
            std::env::var("GWSTAT_APIKEY").context("GWSTAT_APIKEY is not set")?;

        let server = match std::env::var("GWSTAT_SERVER") {
            Ok(server) => server,
            Err(_) => {
                tracing::warn!("GWSTAT_SERVER is not set, fallback to {}", DEFAULT_SERVER);
                DEFAULT_SERVER.to_string()
            }
        };

        let gateway_ids = match std::env::var("GWSTAT_GATEWAYS") {
            Ok(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            Err(_) => Vec::new(),
        };

        let listen = std::env::var("GWSTAT_LISTEN")
            .unwrap_or_else(|_| DEFAULT_LISTEN.to_string())
            .parse()
            .context("GWSTAT_LISTEN is not a valid listen address")?;

        Ok(Self {
            server,
            api_key,
            gateway_ids,
            listen,
        })
    }
}
