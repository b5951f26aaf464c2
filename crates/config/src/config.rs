//! Configuration files.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::{
    net::{Ipv4Addr, SocketAddr},
    path::Path,
    time::Duration,
};

/// Default address the JSON-RPC front end listens on.
pub const DEFAULT_RPC_ADDR: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(Ipv4Addr::LOCALHOST),
    8081,
);

/// Configuration for the txwatch process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Settings of the polling pipeline and the address cache.
    pub tracker: TrackerConfig,
    /// The node to follow.
    pub chain: ChainConfig,
    /// JSON-RPC front end.
    #[serde(default)]
    pub rpc: RpcServerConfig,
}

impl Config {
    /// Loads and validates the configuration at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&raw)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.tracker.validate()?;
        Ok(config)
    }
}

/// Settings of the tracker core.
///
/// Every field is required, there are no built-in defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackerConfig {
    /// Maximum number of tracked addresses. The least recently used address is evicted beyond
    /// this.
    pub max_address_number: usize,
    /// Maximum number of transactions kept per address, newest first.
    pub max_transaction_number: usize,
    /// Number of workers fetching transactions concurrently.
    pub max_concurrent_workers: usize,
    /// How often the chain head is polled.
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Deadline of a single chain head query.
    #[serde(with = "humantime_serde")]
    pub block_number_query_timeout: Duration,
    /// Deadline of a single transactions query.
    #[serde(with = "humantime_serde")]
    pub transactions_query_timeout: Duration,
}

impl TrackerConfig {
    /// Rejects zero sizes and zero durations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("max_address_number", self.max_address_number),
            ("max_transaction_number", self.max_transaction_number),
            ("max_concurrent_workers", self.max_concurrent_workers),
        ];
        for (field, value) in counts {
            if value == 0 {
                return Err(ConfigError::Invalid { field, reason: "must be greater than zero" })
            }
        }

        let durations = [
            ("poll_interval", self.poll_interval),
            ("block_number_query_timeout", self.block_number_query_timeout),
            ("transactions_query_timeout", self.transactions_query_timeout),
        ];
        for (field, value) in durations {
            if value.is_zero() {
                return Err(ConfigError::Invalid { field, reason: "must be a non-zero duration" })
            }
        }
        Ok(())
    }
}

/// The node the tracker follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    /// HTTP JSON-RPC endpoint of the node.
    pub url: String,
}

/// JSON-RPC front end settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RpcServerConfig {
    /// Address the server binds to.
    pub addr: SocketAddr,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self { addr: DEFAULT_RPC_ADDR }
    }
}
