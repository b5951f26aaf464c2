use crate::{BlockNumberRequest, ChainAccessor, ChainError, TransactionsRequest};
use async_trait::async_trait;
use jsonrpsee::{
    core::client::ClientT,
    http_client::{HttpClient, HttpClientBuilder},
    rpc_params,
};
use serde::Serialize;
use tracing::trace;
use txwatch_primitives::{parse_quantity, BlockNumber, Transaction};

/// `eth_blockNumber`
const METHOD_BLOCK_NUMBER: &str = "eth_blockNumber";
/// `trace_filter`
const METHOD_TRACE_FILTER: &str = "trace_filter";

/// Filter object of a `trace_filter` call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TraceFilterParams<'a> {
    from_block: &'a str,
    to_block: &'a str,
    from_address: [&'a str; 1],
    to_address: [&'a str; 1],
}

impl<'a> From<&'a TransactionsRequest> for TraceFilterParams<'a> {
    fn from(req: &'a TransactionsRequest) -> Self {
        Self {
            from_block: &req.from_block,
            to_block: &req.to_block,
            from_address: [&req.from_address],
            to_address: [&req.to_address],
        }
    }
}

/// A [`ChainAccessor`] talking JSON-RPC 2.0 over HTTP to an Ethereum node.
///
/// Requires a node that serves the `trace` namespace.
#[derive(Debug, Clone)]
pub struct JsonRpcChainClient {
    url: String,
    client: HttpClient,
}

impl JsonRpcChainClient {
    /// Creates a client for the node at `url`.
    pub fn new(url: impl Into<String>) -> Result<Self, ChainError> {
        let url = url.into();
        let client = HttpClientBuilder::default().build(&url)?;
        Ok(Self { url, client })
    }

    /// The endpoint this client sends requests to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChainAccessor for JsonRpcChainClient {
    async fn current_block_number(
        &self,
        request: BlockNumberRequest,
    ) -> Result<BlockNumber, ChainError> {
        trace!(target: "chain::rpc", request_id = %request.request_id, method = METHOD_BLOCK_NUMBER, "sending request");
        let number: String = self.client.request(METHOD_BLOCK_NUMBER, rpc_params![]).await?;
        Ok(parse_quantity(&number)?)
    }

    async fn transactions_by_address(
        &self,
        request: TransactionsRequest,
    ) -> Result<Vec<Transaction>, ChainError> {
        trace!(
            target: "chain::rpc",
            request_id = %request.request_id,
            method = METHOD_TRACE_FILTER,
            from_block = %request.from_block,
            to_block = %request.to_block,
            address = %request.from_address,
            "sending request"
        );
        let filter = TraceFilterParams::from(&request);
        let traces: Option<Vec<Transaction>> =
            self.client.request(METHOD_TRACE_FILTER, rpc_params![filter]).await?;
        Ok(traces.unwrap_or_default())
    }
}
