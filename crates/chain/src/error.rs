use std::time::Duration;
use txwatch_primitives::InvalidQuantity;

/// Errors returned by a [`ChainAccessor`](crate::ChainAccessor).
///
/// The tracker does not distinguish between variants: every error means "this call failed".
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// The request could not be delivered or the response could not be read.
    #[error(transparent)]
    Transport(jsonrpsee::core::Error),
    /// The node answered with a JSON-RPC error object.
    #[error("node returned error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i32,
        /// JSON-RPC error message.
        message: String,
    },
    /// The node returned a block number that is not a valid quantity.
    #[error(transparent)]
    InvalidQuantity(#[from] InvalidQuantity),
    /// The call did not complete before its deadline.
    #[error("chain call timed out after {0:?}")]
    Timeout(Duration),
    /// The chain is unavailable for another reason.
    #[error("chain unavailable: {0}")]
    Unavailable(String),
}

impl From<jsonrpsee::core::Error> for ChainError {
    fn from(err: jsonrpsee::core::Error) -> Self {
        use jsonrpsee::{core::Error, types::error::CallError};

        match err {
            Error::Call(CallError::Custom(obj)) => {
                Self::Rpc { code: obj.code(), message: obj.message().to_string() }
            }
            other => Self::Transport(other),
        }
    }
}
