//! JSON-RPC front end of txwatch.
//!
//! Exposes any [`Parser`](txwatch_tracker::Parser) under the `parser` namespace:
//!
//! - `parser_getBlockNumber`: the most recent processed block.
//! - `parser_subscribe(address)`: start tracking an address.
//! - `parser_getTransactions(address)`: the known transactions of an address, newest first.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod api;
mod parser;
mod server;

pub use api::ParserApiServer;
pub use parser::ParserRpc;
pub use server::{launch, RpcServerError, RpcServerHandle};
