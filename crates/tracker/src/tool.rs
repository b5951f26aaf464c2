//! A stateless parser that queries the chain directly.

use crate::Parser;
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tracing::{error, warn};
use txwatch_chain::{
    with_deadline, BlockNumberRequest, ChainAccessor, ChainError, TransactionsRequest,
};
use txwatch_primitives::{BlockNumber, Transaction};

/// Answers every query with a fresh chain call and keeps no state.
///
/// Subscriptions are accepted and ignored. Transactions are fetched over the whole history up to
/// the current head.
#[derive(Debug)]
pub struct ToolParser<C> {
    chain: Arc<C>,
    block_number_query_timeout: Duration,
    transactions_query_timeout: Duration,
}

impl<C> ToolParser<C> {
    /// Creates a parser with the given call deadlines.
    pub fn new(
        chain: Arc<C>,
        block_number_query_timeout: Duration,
        transactions_query_timeout: Duration,
    ) -> Self {
        Self { chain, block_number_query_timeout, transactions_query_timeout }
    }
}

impl<C: ChainAccessor> ToolParser<C> {
    async fn head(&self) -> Result<BlockNumber, ChainError> {
        let request = BlockNumberRequest::new();
        let request_id = request.request_id.clone();
        with_deadline(self.block_number_query_timeout, self.chain.current_block_number(request))
            .await
            .map_err(|err| {
                error!(target: "tracker::tool", %request_id, %err, "failed to fetch chain head");
                err
            })
    }
}

#[async_trait]
impl<C: ChainAccessor> Parser for ToolParser<C> {
    async fn current_block(&self) -> BlockNumber {
        self.head().await.unwrap_or_default()
    }

    async fn subscribe(&self, _address: String) -> bool {
        true
    }

    async fn transactions(&self, address: String) -> Vec<Transaction> {
        let Ok(head) = self.head().await else { return Vec::new() };
        let request = TransactionsRequest::for_address(&address, 0, head);
        let request_id = request.request_id.clone();
        match with_deadline(
            self.transactions_query_timeout,
            self.chain.transactions_by_address(request),
        )
        .await
        {
            Ok(transactions) => transactions,
            Err(err) => {
                warn!(
                    target: "tracker::tool",
                    %address,
                    %request_id,
                    %err,
                    "failed to fetch transactions"
                );
                Vec::new()
            }
        }
    }
}
