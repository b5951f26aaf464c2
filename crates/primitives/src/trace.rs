//! Parity-style call traces as returned by `trace_filter`.
//!
//! See <https://openethereum.github.io/JSONRPC-trace-module#trace_filter>

use crate::{
    serde_helper::num::{from_u64_hex_or_decimal, from_u64_hex_or_decimal_opt},
    BlockNumber,
};
use serde::{Deserialize, Serialize};

/// A single trace touching a tracked address.
///
/// Nodes omit fields depending on the trace type (reward traces carry no transaction hash, failed
/// calls carry no result), so every field falls back to its default when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transaction {
    /// The call that was traced.
    pub action: TraceAction,
    /// Hash of the block containing the trace.
    pub block_hash: String,
    /// Number of the block containing the trace.
    #[serde(deserialize_with = "from_u64_hex_or_decimal")]
    pub block_number: BlockNumber,
    /// Outcome of the call, `None` if it reverted.
    pub result: Option<TraceOutput>,
    /// Number of child traces.
    pub subtraces: u64,
    /// Position of this trace in the call tree.
    pub trace_address: Vec<u64>,
    /// Hash of the enclosing transaction.
    pub transaction_hash: Option<String>,
    /// Index of the enclosing transaction within the block.
    #[serde(deserialize_with = "from_u64_hex_or_decimal_opt")]
    pub transaction_position: Option<u64>,
    /// Trace type, e.g. `call` or `create`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// The `action` payload of a trace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TraceAction {
    /// Sender.
    pub from: String,
    /// `call`, `delegatecall`, `staticcall`, ...
    pub call_type: String,
    /// Gas provided, as a hex quantity.
    pub gas: String,
    /// Call data.
    pub input: String,
    /// Recipient.
    pub to: String,
    /// Transferred value, as a hex quantity.
    pub value: String,
}

/// The `result` payload of a successful trace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TraceOutput {
    /// Gas used, as a hex quantity.
    pub gas_used: String,
    /// Return data.
    pub output: String,
}
