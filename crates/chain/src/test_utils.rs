//! An in-memory [`ChainAccessor`] for tests.

use crate::{BlockNumberRequest, ChainAccessor, ChainError, TransactionsRequest};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Duration,
};
use txwatch_primitives::{BlockNumber, Transaction};

/// A scriptable chain.
///
/// Clones share state, so a test can keep a handle while the tracker owns another.
#[derive(Debug, Clone, Default)]
pub struct MockChain {
    inner: Arc<Mutex<MockChainInner>>,
}

#[derive(Debug, Default)]
struct MockChainInner {
    head: BlockNumber,
    /// Number of upcoming head queries that fail.
    head_failures: usize,
    head_requests: usize,
    failing_addresses: HashSet<String>,
    transactions: HashMap<String, Vec<Transaction>>,
    requests: Vec<TransactionsRequest>,
    fetch_delay: Option<Duration>,
}

impl MockChain {
    /// Creates a chain whose head is at `head`.
    pub fn new(head: BlockNumber) -> Self {
        let chain = Self::default();
        chain.set_head(head);
        chain
    }

    /// Moves the chain head.
    pub fn set_head(&self, head: BlockNumber) {
        self.inner.lock().head = head;
    }

    /// Makes the next `count` head queries fail.
    pub fn fail_next_head_queries(&self, count: usize) {
        self.inner.lock().head_failures = count;
    }

    /// Makes every transaction query for `address` fail until [`Self::recover_address`].
    pub fn fail_address(&self, address: &str) {
        self.inner.lock().failing_addresses.insert(address.to_string());
    }

    /// Undoes [`Self::fail_address`].
    pub fn recover_address(&self, address: &str) {
        self.inner.lock().failing_addresses.remove(address);
    }

    /// Sets the batch returned by the next transaction queries for `address`.
    pub fn set_transactions(&self, address: &str, transactions: Vec<Transaction>) {
        self.inner.lock().transactions.insert(address.to_string(), transactions);
    }

    /// Delays every transaction query by `delay`.
    pub fn set_fetch_delay(&self, delay: Option<Duration>) {
        self.inner.lock().fetch_delay = delay;
    }

    /// All transaction queries received so far.
    pub fn transaction_requests(&self) -> Vec<TransactionsRequest> {
        self.inner.lock().requests.clone()
    }

    /// Transaction queries received so far for `address`.
    pub fn transaction_requests_for(&self, address: &str) -> Vec<TransactionsRequest> {
        self.inner.lock().requests.iter().filter(|r| r.from_address == address).cloned().collect()
    }

    /// Number of head queries received so far.
    pub fn head_requests(&self) -> usize {
        self.inner.lock().head_requests
    }
}

#[async_trait]
impl ChainAccessor for MockChain {
    async fn current_block_number(
        &self,
        _request: BlockNumberRequest,
    ) -> Result<BlockNumber, ChainError> {
        let mut inner = self.inner.lock();
        inner.head_requests += 1;
        if inner.head_failures > 0 {
            inner.head_failures -= 1;
            return Err(ChainError::Unavailable("head query failed".to_string()))
        }
        Ok(inner.head)
    }

    async fn transactions_by_address(
        &self,
        request: TransactionsRequest,
    ) -> Result<Vec<Transaction>, ChainError> {
        let delay = {
            let mut inner = self.inner.lock();
            inner.requests.push(request.clone());
            inner.fetch_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let inner = self.inner.lock();
        if inner.failing_addresses.contains(&request.from_address) {
            return Err(ChainError::Unavailable(format!("{} unavailable", request.from_address)))
        }
        Ok(inner.transactions.get(&request.from_address).cloned().unwrap_or_default())
    }
}

/// Returns a trace with the given transaction hash at `block`.
pub fn transaction(hash: &str, block: BlockNumber) -> Transaction {
    Transaction {
        block_number: block,
        transaction_hash: Some(hash.to_string()),
        kind: "call".to_string(),
        ..Default::default()
    }
}
