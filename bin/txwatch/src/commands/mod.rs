//! Subcommands of the txwatch binary.

pub(crate) mod query;
pub(crate) mod server;
