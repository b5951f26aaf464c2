//! Commonly used types in txwatch.
//!
//! This crate contains the transaction trace record served to callers and the helpers used to
//! encode and decode block numbers as JSON-RPC quantities.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod quantity;
pub mod serde_helper;
mod trace;

pub use quantity::{parse_quantity, to_quantity, InvalidQuantity};
pub use trace::{TraceAction, TraceOutput, Transaction};

/// A block number.
pub type BlockNumber = u64;
