//! Standalone crate for txwatch configuration types.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
mod error;

pub use config::{ChainConfig, Config, RpcServerConfig, TrackerConfig, DEFAULT_RPC_ADDR};
pub use error::ConfigError;
