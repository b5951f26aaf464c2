//! Exercises [`JsonRpcChainClient`] against an in-process JSON-RPC node.

use assert_matches::assert_matches;
use jsonrpsee::{
    core::Error as RpcError,
    server::{ServerBuilder, ServerHandle},
    types::error::{CallError, ErrorObject},
    RpcModule,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use txwatch_chain::{
    BlockNumberRequest, ChainAccessor, ChainError, JsonRpcChainClient, TransactionsRequest,
};

#[derive(Debug, Default)]
struct NodeState {
    head: String,
    filters: Vec<Value>,
    fail_traces: bool,
}

async fn launch_node(state: Arc<Mutex<NodeState>>) -> (JsonRpcChainClient, ServerHandle) {
    let mut module = RpcModule::new(state);
    module
        .register_method("eth_blockNumber", |_, state| Ok(state.lock().head.clone()))
        .unwrap();
    module
        .register_method("trace_filter", |params, state| -> Result<Value, RpcError> {
            let filters: Vec<Value> = params.parse()?;
            let mut state = state.lock();
            if state.fail_traces {
                return Err(RpcError::Call(CallError::Custom(ErrorObject::owned(
                    -32000,
                    "trace_filter disabled",
                    None::<()>,
                ))))
            }
            state.filters.extend(filters);
            Ok(json!([
                { "blockNumber": 100, "transactionHash": "0x01", "type": "call" },
                { "blockNumber": "0xc8", "transactionHash": "0x02", "type": "call" },
            ]))
        })
        .unwrap();

    let server = ServerBuilder::default().build("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap();
    let handle = server.start(module).unwrap();
    let client = JsonRpcChainClient::new(format!("http://{addr}")).unwrap();
    (client, handle)
}

#[tokio::test(flavor = "multi_thread")]
async fn fetches_block_number() {
    let state = Arc::new(Mutex::new(NodeState { head: "0x10d4f".to_string(), ..Default::default() }));
    let (client, _handle) = launch_node(state.clone()).await;

    let head = client.current_block_number(BlockNumberRequest::new()).await.unwrap();
    assert_eq!(head, 0x10d4f);

    state.lock().head = "garbage".to_string();
    let err = client.current_block_number(BlockNumberRequest::new()).await.unwrap_err();
    assert_matches!(err, ChainError::InvalidQuantity(_));
}

#[tokio::test(flavor = "multi_thread")]
async fn fetches_traces_with_filter() {
    let state = Arc::new(Mutex::new(NodeState::default()));
    let (client, _handle) = launch_node(state.clone()).await;

    let traces = client
        .transactions_by_address(TransactionsRequest::for_address("0xffff", 100, 200))
        .await
        .unwrap();
    assert_eq!(traces.len(), 2);
    assert_eq!(traces[0].block_number, 100);
    assert_eq!(traces[1].block_number, 200);
    assert_eq!(traces[1].transaction_hash.as_deref(), Some("0x02"));

    let filters = state.lock().filters.clone();
    assert_eq!(
        filters,
        vec![json!({
            "fromBlock": "0x64",
            "toBlock": "0xc8",
            "fromAddress": ["0xffff"],
            "toAddress": ["0xffff"],
        })]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn maps_error_objects() {
    let state = Arc::new(Mutex::new(NodeState { fail_traces: true, ..Default::default() }));
    let (client, _handle) = launch_node(state).await;

    let err = client
        .transactions_by_address(TransactionsRequest::for_address("0xffff", 1, 2))
        .await
        .unwrap_err();
    assert_matches!(err, ChainError::Rpc { code: -32000, .. });
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_node_is_a_transport_error() {
    // nothing listens on the discard port
    let client = JsonRpcChainClient::new("http://127.0.0.1:9").unwrap();
    assert_eq!(client.url(), "http://127.0.0.1:9");
    let err = client.current_block_number(BlockNumberRequest::new()).await.unwrap_err();
    assert_matches!(err, ChainError::Transport(_));
}
