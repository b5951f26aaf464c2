use crate::ParserApiServer;
use async_trait::async_trait;
use jsonrpsee::core::RpcResult;
use std::sync::Arc;
use tracing::trace;
use txwatch_primitives::{BlockNumber, Transaction};
use txwatch_tracker::Parser;

/// `parser` API implementation.
///
/// This type provides the functionality for handling `parser` related requests.
#[derive(Debug)]
pub struct ParserRpc<P: ?Sized> {
    parser: Arc<P>,
}

impl<P: ?Sized> ParserRpc<P> {
    /// Creates a new instance serving `parser`.
    pub fn new(parser: Arc<P>) -> Self {
        Self { parser }
    }
}

#[async_trait]
impl<P> ParserApiServer for ParserRpc<P>
where
    P: Parser + ?Sized + 'static,
{
    /// Handler for `parser_getBlockNumber`
    async fn block_number(&self) -> RpcResult<BlockNumber> {
        trace!(target: "rpc::parser", "Serving parser_getBlockNumber");
        Ok(self.parser.current_block().await)
    }

    /// Handler for `parser_subscribe`
    async fn subscribe(&self, address: String) -> RpcResult<bool> {
        trace!(target: "rpc::parser", %address, "Serving parser_subscribe");
        Ok(self.parser.subscribe(address).await)
    }

    /// Handler for `parser_getTransactions`
    async fn transactions(&self, address: String) -> RpcResult<Vec<Transaction>> {
        trace!(target: "rpc::parser", %address, "Serving parser_getTransactions");
        Ok(self.parser.transactions(address).await)
    }
}
