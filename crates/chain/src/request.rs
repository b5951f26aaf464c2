use std::sync::atomic::{AtomicU64, Ordering};
use txwatch_primitives::{to_quantity, BlockNumber};

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// Returns a process-unique request id.
pub fn next_request_id() -> String {
    REQUEST_ID.fetch_add(1, Ordering::Relaxed).to_string()
}

/// Request for the current chain head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockNumberRequest {
    /// Correlates log lines of a single call.
    pub request_id: String,
}

impl BlockNumberRequest {
    /// Creates a request with a fresh id.
    pub fn new() -> Self {
        Self { request_id: next_request_id() }
    }
}

impl Default for BlockNumberRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Request for the traces of an address within a block window.
///
/// Block bounds are `0x`-prefixed hex quantities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionsRequest {
    /// First block of the window.
    pub from_block: String,
    /// Last block of the window.
    pub to_block: String,
    /// Match traces sent by this address.
    pub from_address: String,
    /// Match traces received by this address.
    pub to_address: String,
    /// Correlates log lines of a single call.
    pub request_id: String,
}

impl TransactionsRequest {
    /// Creates a request for the traces sent from or to `address` between the two blocks.
    pub fn for_address(address: &str, from_block: BlockNumber, to_block: BlockNumber) -> Self {
        Self {
            from_block: to_quantity(from_block),
            to_block: to_quantity(to_block),
            from_address: address.to_string(),
            to_address: address.to_string(),
            request_id: next_request_id(),
        }
    }
}
