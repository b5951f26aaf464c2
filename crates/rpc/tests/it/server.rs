//! Calls the `parser` namespace over HTTP.

use async_trait::async_trait;
use jsonrpsee::{
    core::client::ClientT,
    http_client::{HttpClient, HttpClientBuilder},
    rpc_params,
};
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};
use txwatch_chain::test_utils::{transaction, MockChain};
use txwatch_config::TrackerConfig;
use txwatch_primitives::{BlockNumber, Transaction};
use txwatch_rpc::{launch, RpcServerHandle};
use txwatch_tasks::TokioTaskExecutor;
use txwatch_tracker::{Parser, ServiceParser, ToolParser};

#[derive(Debug, Default)]
struct RecordingParser {
    subscribed: Mutex<Vec<String>>,
}

#[async_trait]
impl Parser for RecordingParser {
    async fn current_block(&self) -> BlockNumber {
        0x10d4f
    }

    async fn subscribe(&self, address: String) -> bool {
        self.subscribed.lock().unwrap().push(address);
        true
    }

    async fn transactions(&self, address: String) -> Vec<Transaction> {
        if self.subscribed.lock().unwrap().contains(&address) {
            vec![transaction("0x01", 7)]
        } else {
            Vec::new()
        }
    }
}

fn local() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 0))
}

async fn serve<P: Parser + ?Sized + 'static>(parser: Arc<P>) -> (RpcServerHandle, HttpClient) {
    let handle = launch(parser, local()).await.unwrap();
    let client = HttpClientBuilder::default().build(handle.http_url()).unwrap();
    (handle, client)
}

#[tokio::test(flavor = "multi_thread")]
async fn serves_parser_namespace() {
    let parser = Arc::new(RecordingParser::default());
    let (handle, client) = serve(parser.clone()).await;
    assert_ne!(handle.local_addr().port(), 0);

    let head: BlockNumber = client.request("parser_getBlockNumber", rpc_params![]).await.unwrap();
    assert_eq!(head, 0x10d4f);

    let empty: Vec<Transaction> =
        client.request("parser_getTransactions", rpc_params!["0xabc"]).await.unwrap();
    assert!(empty.is_empty());

    let accepted: bool = client.request("parser_subscribe", rpc_params!["0xabc"]).await.unwrap();
    assert!(accepted);
    assert_eq!(*parser.subscribed.lock().unwrap(), vec!["0xabc".to_string()]);

    let transactions: Vec<Transaction> =
        client.request("parser_getTransactions", rpc_params!["0xabc"]).await.unwrap();
    assert_eq!(transactions, vec![transaction("0x01", 7)]);

    handle.stop();
    tokio::time::timeout(Duration::from_secs(5), handle.stopped()).await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn rejects_missing_address() {
    let (_handle, client) = serve(Arc::new(RecordingParser::default())).await;
    let res: Result<bool, _> = client.request("parser_subscribe", rpc_params![]).await;
    assert!(res.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn serves_tool_parser() {
    let chain = MockChain::new(0x20);
    chain.set_transactions("0xabc", vec![transaction("0x02", 3)]);
    let parser: Arc<dyn Parser> = Arc::new(ToolParser::new(
        Arc::new(chain.clone()),
        Duration::from_secs(1),
        Duration::from_secs(1),
    ));
    let (_handle, client) = serve(parser).await;

    let head: BlockNumber = client.request("parser_getBlockNumber", rpc_params![]).await.unwrap();
    assert_eq!(head, 0x20);

    let transactions: Vec<Transaction> =
        client.request("parser_getTransactions", rpc_params!["0xabc"]).await.unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(chain.transaction_requests()[0].from_block, "0x0");
}

#[tokio::test(flavor = "multi_thread")]
async fn serves_tracked_transactions() {
    let chain = MockChain::new(10);
    let config = TrackerConfig {
        max_address_number: 4,
        max_transaction_number: 4,
        max_concurrent_workers: 2,
        poll_interval: Duration::from_millis(10),
        block_number_query_timeout: Duration::from_millis(500),
        transactions_query_timeout: Duration::from_millis(500),
    };
    let parser =
        ServiceParser::spawn(Arc::new(chain.clone()), config, &TokioTaskExecutor::default())
            .await
            .unwrap();
    let (_handle, client) = serve(Arc::new(parser)).await;

    let accepted: bool = client.request("parser_subscribe", rpc_params!["0xabc"]).await.unwrap();
    assert!(accepted);
    chain.set_transactions("0xabc", vec![transaction("0x03", 11)]);
    chain.set_head(11);

    let transactions = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let transactions: Vec<Transaction> =
                client.request("parser_getTransactions", rpc_params!["0xabc"]).await.unwrap();
            if !transactions.is_empty() {
                return transactions
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(transactions, vec![transaction("0x03", 11)]);

    let head: BlockNumber = client.request("parser_getBlockNumber", rpc_params![]).await.unwrap();
    assert_eq!(head, 11);
}
