use assert_matches::assert_matches;
use std::{sync::Arc, time::Duration};
use txwatch_chain::test_utils::{transaction, MockChain};
use txwatch_config::{ConfigError, TrackerConfig};
use txwatch_primitives::Transaction;
use txwatch_tasks::TokioTaskExecutor;
use txwatch_tracker::{Parser, ServiceParser, TrackerError};

fn config() -> TrackerConfig {
    TrackerConfig {
        max_address_number: 8,
        max_transaction_number: 3,
        max_concurrent_workers: 2,
        poll_interval: Duration::from_millis(10),
        block_number_query_timeout: Duration::from_millis(500),
        transactions_query_timeout: Duration::from_millis(500),
    }
}

async fn spawn(chain: &MockChain, config: TrackerConfig) -> ServiceParser {
    txwatch_tracing::init_test_tracing();
    ServiceParser::spawn(Arc::new(chain.clone()), config, &TokioTaskExecutor::default())
        .await
        .unwrap()
}

async fn eventually(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

fn hashes(transactions: &[Transaction]) -> Vec<&str> {
    transactions.iter().filter_map(|tx| tx.transaction_hash.as_deref()).collect()
}

#[tokio::test]
async fn tracks_new_blocks_for_subscribed_address() {
    let chain = MockChain::new(100);
    let parser = spawn(&chain, config()).await;
    assert_eq!(parser.current_block(), 100);

    assert!(parser.subscribe("0xa"));
    chain.set_transactions("0xa", vec![transaction("t1", 101)]);
    chain.set_head(101);
    eventually(|| parser.transactions("0xa").len() == 1).await;
    assert_eq!(parser.current_block(), 101);

    chain.set_transactions("0xa", vec![transaction("t2", 105)]);
    chain.set_head(105);
    eventually(|| parser.transactions("0xa").len() == 2).await;
    assert_eq!(hashes(&parser.transactions("0xa")), vec!["t2", "t1"]);
    assert_eq!(parser.current_block(), 105);

    let windows = chain
        .transaction_requests_for("0xa")
        .into_iter()
        .map(|request| (request.from_block, request.to_block))
        .collect::<Vec<_>>();
    assert_eq!(
        windows,
        vec![("0x65".to_string(), "0x65".to_string()), ("0x65".to_string(), "0x69".to_string())]
    );
}

#[tokio::test]
async fn unknown_address_has_no_transactions() {
    let chain = MockChain::new(1);
    let parser = spawn(&chain, config()).await;
    assert!(parser.transactions("0xnobody").is_empty());
    assert_eq!(parser.tracked_addresses(), 0);
}

#[tokio::test]
async fn subscription_waits_for_next_block() {
    let chain = MockChain::new(50);
    let parser = spawn(&chain, config()).await;
    parser.subscribe("0xa");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(parser.tracked_addresses(), 0);

    chain.set_head(51);
    eventually(|| parser.tracked_addresses() == 1).await;
}

#[tokio::test]
async fn keeps_newest_transactions_only() {
    let chain = MockChain::new(10);
    let parser = spawn(&chain, config()).await;
    parser.subscribe("0xa");
    chain.set_transactions(
        "0xa",
        vec![
            transaction("n1", 11),
            transaction("n2", 11),
            transaction("n3", 11),
            transaction("n4", 11),
        ],
    );
    chain.set_head(11);

    eventually(|| !parser.transactions("0xa").is_empty()).await;
    assert_eq!(hashes(&parser.transactions("0xa")), vec!["n1", "n2", "n3"]);
}

#[tokio::test]
async fn failed_fetch_is_retried_from_the_same_block() {
    let chain = MockChain::new(10);
    let parser = spawn(&chain, config()).await;
    parser.subscribe("0xa");
    chain.fail_address("0xa");
    chain.set_head(11);
    eventually(|| chain.transaction_requests_for("0xa").len() == 1).await;

    chain.set_head(12);
    eventually(|| chain.transaction_requests_for("0xa").len() == 2).await;
    assert!(parser.transactions("0xa").is_empty());

    chain.recover_address("0xa");
    chain.set_transactions("0xa", vec![transaction("late", 12)]);
    chain.set_head(13);
    eventually(|| !parser.transactions("0xa").is_empty()).await;

    let from_blocks = chain
        .transaction_requests_for("0xa")
        .into_iter()
        .map(|request| request.from_block)
        .collect::<Vec<_>>();
    assert_eq!(from_blocks, vec!["0xb", "0xb", "0xb"]);
}

#[tokio::test]
async fn least_recently_used_address_is_evicted() {
    let chain = MockChain::new(10);
    let parser = spawn(&chain, TrackerConfig { max_address_number: 2, ..config() }).await;
    chain.set_transactions("0xa", vec![transaction("a", 11)]);

    parser.subscribe("0xa");
    parser.subscribe("0xb");
    chain.set_head(11);
    eventually(|| !parser.transactions("0xa").is_empty()).await;

    // 0xa was just read, so 0xb is the least recently used
    parser.subscribe("0xc");
    chain.set_head(12);
    eventually(|| chain.transaction_requests_for("0xc").len() == 1).await;

    assert_eq!(parser.tracked_addresses(), 2);
    assert!(!parser.transactions("0xa").is_empty());
    assert!(parser.transactions("0xb").is_empty());
}

#[tokio::test]
async fn rounds_never_overlap() {
    let chain = MockChain::new(10);
    chain.set_fetch_delay(Some(Duration::from_millis(100)));
    let parser = spawn(&chain, config()).await;
    parser.subscribe("0xa");

    chain.set_head(11);
    eventually(|| chain.transaction_requests_for("0xa").len() == 1).await;
    // several heads arrive while the slow round is running
    chain.set_head(12);
    tokio::time::sleep(Duration::from_millis(20)).await;
    chain.set_head(13);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(chain.transaction_requests_for("0xa").len(), 1);
    assert_eq!(parser.current_block(), 11);

    eventually(|| chain.transaction_requests_for("0xa").len() == 2).await;
    let second = &chain.transaction_requests_for("0xa")[1];
    assert_eq!(second.from_block, "0xb");
    assert_eq!(second.to_block, "0xd");
}

#[tokio::test]
async fn initial_head_failure_is_fatal() {
    let chain = MockChain::new(10);
    chain.fail_next_head_queries(1);
    let res = ServiceParser::spawn(Arc::new(chain), config(), &TokioTaskExecutor::default()).await;
    assert_matches!(res, Err(TrackerError::InitialHead(_)));
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let chain = MockChain::new(10);
    let config = TrackerConfig { max_concurrent_workers: 0, ..config() };
    let res = ServiceParser::spawn(Arc::new(chain), config, &TokioTaskExecutor::default()).await;
    assert_matches!(
        res,
        Err(TrackerError::Config(ConfigError::Invalid { field: "max_concurrent_workers", .. }))
    );
}

#[tokio::test]
async fn shutdown_stops_polling() {
    let chain = MockChain::new(10);
    let parser = spawn(&chain, config()).await;
    eventually(|| chain.head_requests() > 2).await;

    parser.shutdown();
    tokio::time::sleep(Duration::from_millis(30)).await;
    let polled = chain.head_requests();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(chain.head_requests(), polled);
    assert_eq!(parser.current_block(), 10);
}

#[tokio::test]
async fn serves_through_parser_trait() {
    let chain = MockChain::new(10);
    let parser: Arc<dyn Parser> = Arc::new(spawn(&chain, config()).await);
    assert_eq!(parser.current_block().await, 10);
    assert!(parser.subscribe("0xa".to_string()).await);
    chain.set_transactions("0xa", vec![transaction("t", 11)]);
    chain.set_head(11);

    tokio::time::timeout(Duration::from_secs(5), async {
        while parser.transactions("0xa".to_string()).await.is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(parser.current_block().await, 11);
}
