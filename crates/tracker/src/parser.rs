use async_trait::async_trait;
use std::fmt::Debug;
use txwatch_primitives::{BlockNumber, Transaction};

/// The query surface shared by every parser flavour.
///
/// Implementations never fail: chain errors are logged and surface as empty or zero values.
#[async_trait]
pub trait Parser: Send + Sync + Debug {
    /// The most recent block the parser has processed.
    async fn current_block(&self) -> BlockNumber;

    /// Starts tracking `address`. Returns whether the subscription was accepted.
    async fn subscribe(&self, address: String) -> bool;

    /// The known transactions of `address`, newest first.
    async fn transactions(&self, address: String) -> Vec<Transaction>;
}
