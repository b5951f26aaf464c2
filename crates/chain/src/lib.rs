//! Access to the ledger that txwatch follows.
//!
//! The [`ChainAccessor`] trait is the only way the tracker talks to the chain. It exposes the two
//! calls the tracker needs: the current chain head and the traces touching an address within a
//! block window. [`JsonRpcChainClient`] implements it against a node's HTTP JSON-RPC endpoint.
//!
//! Calls carry no deadline of their own, callers bound them with [`with_deadline`].
//!
//! # Feature Flags
//!
//! - `test-utils`: Export an in-memory [`ChainAccessor`] for testing.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg))]

use async_trait::async_trait;
use std::{fmt::Debug, future::Future, time::Duration};
use txwatch_primitives::{BlockNumber, Transaction};

mod client;
mod error;
mod request;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use client::JsonRpcChainClient;
pub use error::ChainError;
pub use request::{next_request_id, BlockNumberRequest, TransactionsRequest};

/// Read access to a remote ledger.
#[async_trait]
pub trait ChainAccessor: Send + Sync + Debug {
    /// Returns the number of the most recent block known to the node.
    async fn current_block_number(
        &self,
        request: BlockNumberRequest,
    ) -> Result<BlockNumber, ChainError>;

    /// Returns the traces sent from or to an address within the requested block window.
    async fn transactions_by_address(
        &self,
        request: TransactionsRequest,
    ) -> Result<Vec<Transaction>, ChainError>;
}

/// Runs a chain call to completion or fails with [`ChainError::Timeout`] once `deadline` elapses.
pub async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T, ChainError>
where
    F: Future<Output = Result<T, ChainError>>,
{
    tokio::time::timeout(deadline, call).await.map_err(|_| ChainError::Timeout(deadline))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn deadline_elapses() {
        let res: Result<(), _> = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert_matches!(res, Err(ChainError::Timeout(_)));
    }

    #[tokio::test]
    async fn deadline_passes_result_through() {
        let res = with_deadline(Duration::from_secs(1), async { Ok(7u64) }).await;
        assert_eq!(res.unwrap(), 7);

        let res: Result<u64, _> = with_deadline(Duration::from_secs(1), async {
            Err(ChainError::Unavailable("down".to_string()))
        })
        .await;
        assert_matches!(res, Err(ChainError::Unavailable(_)));
    }
}
