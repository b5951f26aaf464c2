use jsonrpsee::{core::RpcResult, proc_macros::rpc};
use txwatch_primitives::{BlockNumber, Transaction};

/// Parser rpc interface.
#[rpc(server, namespace = "parser")]
pub trait ParserApi {
    /// Returns the most recent processed block.
    #[method(name = "getBlockNumber")]
    async fn block_number(&self) -> RpcResult<BlockNumber>;

    /// Starts tracking an address. Returns whether the subscription was accepted.
    #[method(name = "subscribe")]
    async fn subscribe(&self, address: String) -> RpcResult<bool>;

    /// Returns the known transactions of an address, newest first.
    #[method(name = "getTransactions")]
    async fn transactions(&self, address: String) -> RpcResult<Vec<Transaction>>;
}
