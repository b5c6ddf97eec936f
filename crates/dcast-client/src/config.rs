//! Client configuration loaded from environment variables.
//!
//! All settings have defaults so the client can start with zero
//! configuration against a local development chain.

use std::time::Duration;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// JSON-RPC endpoint of the chain the DCast contract is deployed on.
    /// Env: `DCAST_RPC_URL`
    /// Default: `http://127.0.0.1:8545`
    pub rpc_url: String,

    /// Chain id the client expects the wallet to be on.
    /// Env: `DCAST_CHAIN_ID`
    /// Default: `31337` (local development chain)
    pub chain_id: u64,

    /// Timeout applied to each ledger read.
    /// Env: `DCAST_REQUEST_TIMEOUT_SECS`
    /// Default: `30`
    pub request_timeout: Duration,

    /// Capacity of the client event channel.
    /// Env: `DCAST_EVENT_CAPACITY`
    /// Default: `64`
    pub event_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            chain_id: 31337,
            request_timeout: Duration::from_secs(30),
            event_capacity: 64,
        }
    }
}

impl ClientConfig {
    /// Build a config from the environment, falling back to defaults for
    /// anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            rpc_url: std::env::var("DCAST_RPC_URL").unwrap_or(defaults.rpc_url),
            chain_id: env_parse("DCAST_CHAIN_ID").unwrap_or(defaults.chain_id),
            request_timeout: env_parse("DCAST_REQUEST_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            event_capacity: env_parse("DCAST_EVENT_CAPACITY").unwrap_or(defaults.event_capacity),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, raw = %raw, "Ignoring unparsable environment override");
            None
        }
    }
}
