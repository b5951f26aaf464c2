//! Address transaction tracking.
//!
//! Clients subscribe addresses and later ask for the transactions that touched them. Two
//! [`Parser`] flavours answer those queries:
//!
//! - [`ServiceParser`] keeps a bounded, recency ordered [`AddressCache`] that a background
//!   pipeline refreshes whenever the chain head advances. A scheduler polls the head, admits
//!   queued subscriptions and dispatches one fetch task per tracked address to a pool of workers.
//!   A controller waits until every task of the round has reported back before the next round may
//!   start, so new heads seen in the meantime are coalesced into the next round.
//! - [`ToolParser`] holds no state and forwards every query to the chain.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod cache;
mod error;
mod executor;
mod parser;
mod scheduler;
mod service;
mod state;
mod subscription;
mod tool;

pub use cache::{AddressCache, AddressRecord};
pub use error::TrackerError;
pub use parser::Parser;
pub use service::ServiceParser;
pub use subscription::SubscriptionQueue;
pub use tool::ToolParser;
