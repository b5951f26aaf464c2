//! Bounded, recency ordered store of tracked addresses.

use std::collections::HashMap;
use txwatch_primitives::{BlockNumber, Transaction};

/// Everything the tracker knows about one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRecord {
    address: String,
    last_processed_block: BlockNumber,
    /// Newest first, never longer than the configured maximum.
    transactions: Vec<Transaction>,
}

impl AddressRecord {
    /// Creates a record without transactions whose history starts at `last_processed_block`.
    pub fn new(address: impl Into<String>, last_processed_block: BlockNumber) -> Self {
        Self { address: address.into(), last_processed_block, transactions: Vec::new() }
    }

    /// Sets the stored transactions, newest first.
    pub fn with_transactions(mut self, transactions: Vec<Transaction>) -> Self {
        self.transactions = transactions;
        self
    }

    /// The tracked address.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The block up to which this address has been fetched.
    pub fn last_processed_block(&self) -> BlockNumber {
        self.last_processed_block
    }

    /// Stored transactions, newest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Merges a freshly fetched batch into the record and marks `target` as processed.
    ///
    /// The fetched batch always wins: it is truncated to `max_transactions` and whatever room is
    /// left is filled with the newest previously stored transactions. The processed block advances
    /// even if the batch is empty.
    ///
    /// Returns how many fetched transactions were kept.
    pub fn merge(
        &mut self,
        mut fetched: Vec<Transaction>,
        max_transactions: usize,
        target: BlockNumber,
    ) -> usize {
        fetched.truncate(max_transactions);
        let kept = fetched.len();
        let room = max_transactions - kept;

        let previous = std::mem::take(&mut self.transactions);
        fetched.extend(previous.into_iter().take(room));
        self.transactions = fetched;
        self.last_processed_block = self.last_processed_block.max(target);
        kept
    }
}

#[derive(Debug)]
struct Node {
    record: AddressRecord,
    /// Towards the most recently used end.
    prev: Option<usize>,
    /// Towards the least recently used end.
    next: Option<usize>,
}

/// A capacity bounded map from address to [`AddressRecord`], ordered by recency.
///
/// Nodes live in an arena and are linked by index. The only way a node leaves the cache is
/// eviction, which hands its slot straight to the record being inserted, so the arena never has
/// holes and `nodes.len() == index.len()` at all times.
///
/// The cache is not synchronized; the tracker guards it with its state lock.
#[derive(Debug)]
pub struct AddressCache {
    capacity: usize,
    index: HashMap<String, usize>,
    nodes: Vec<Node>,
    /// Most recently touched.
    head: Option<usize>,
    /// Least recently touched, next to be evicted.
    tail: Option<usize>,
}

impl AddressCache {
    /// Creates an empty cache holding at most `capacity` addresses.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            index: HashMap::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    /// Inserts a record for a new address at the most recently used position.
    ///
    /// Does nothing if the address is already present: the existing history and its position are
    /// kept. Otherwise, if the cache is full, the least recently touched record is evicted and
    /// returned.
    pub fn put(&mut self, record: AddressRecord) -> Option<AddressRecord> {
        if self.capacity == 0 || self.index.contains_key(record.address()) {
            return None
        }

        if self.index.len() < self.capacity {
            let idx = self.nodes.len();
            self.index.insert(record.address().to_string(), idx);
            self.nodes.push(Node { record, prev: None, next: None });
            self.push_front(idx);
            return None
        }

        let idx = self.tail?;
        self.unlink(idx);
        let evicted = std::mem::replace(&mut self.nodes[idx].record, record);
        self.index.remove(evicted.address());
        self.index.insert(self.nodes[idx].record.address().to_string(), idx);
        self.push_front(idx);
        Some(evicted)
    }

    /// Returns the record of `address` and marks it as most recently used.
    ///
    /// This reorders the cache and therefore needs exclusive access.
    pub fn get(&mut self, address: &str) -> Option<&AddressRecord> {
        let idx = *self.index.get(address)?;
        if self.head != Some(idx) {
            self.unlink(idx);
            self.push_front(idx);
        }
        Some(&self.nodes[idx].record)
    }

    /// Returns the record of `address` without touching its recency.
    pub fn peek(&self, address: &str) -> Option<&AddressRecord> {
        self.index.get(address).map(|&idx| &self.nodes[idx].record)
    }

    /// Mutable access to the record of `address` without touching its recency.
    pub fn peek_mut(&mut self, address: &str) -> Option<&mut AddressRecord> {
        let idx = *self.index.get(address)?;
        Some(&mut self.nodes[idx].record)
    }

    /// Returns `true` if `address` is tracked.
    pub fn contains(&self, address: &str) -> bool {
        self.index.contains_key(address)
    }

    /// Number of tracked addresses.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if no address is tracked.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Maximum number of tracked addresses.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All tracked addresses, most recently used first.
    pub fn snapshot(&self) -> Vec<String> {
        let mut addresses = Vec::with_capacity(self.len());
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            let node = &self.nodes[idx];
            addresses.push(node.record.address().to_string());
            cursor = node.next;
        }
        addresses
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev.take(), self.nodes[idx].next.take());
        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => self.tail = prev,
        }
    }

    fn push_front(&mut self, idx: usize) {
        self.nodes[idx].prev = None;
        self.nodes[idx].next = self.head;
        match self.head {
            Some(head) => self.nodes[head].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }
}
