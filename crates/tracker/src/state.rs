use crate::{cache::AddressCache, subscription::SubscriptionQueue};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use txwatch_config::TrackerConfig;
use txwatch_primitives::BlockNumber;

/// State guarded by the tracker lock.
#[derive(Debug)]
pub(crate) struct TrackerState {
    /// Head block of the most recently started round.
    pub(crate) processed_block: BlockNumber,
    pub(crate) cache: AddressCache,
}

/// State shared by the facade, the scheduler, the workers and the controller.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) state: RwLock<TrackerState>,
    /// Set by the scheduler before a round is announced, cleared by the controller once every
    /// task of that round has reported back.
    pub(crate) processing: AtomicBool,
    pub(crate) subscriptions: SubscriptionQueue,
    pub(crate) config: TrackerConfig,
}

impl Shared {
    pub(crate) fn new(head: BlockNumber, config: TrackerConfig) -> Self {
        Self {
            state: RwLock::new(TrackerState {
                processed_block: head,
                cache: AddressCache::new(config.max_address_number),
            }),
            processing: AtomicBool::new(false),
            subscriptions: SubscriptionQueue::new(),
            config,
        }
    }

    pub(crate) fn processed_block(&self) -> BlockNumber {
        self.state.read().processed_block
    }

    pub(crate) fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub(crate) fn set_processing(&self, processing: bool) {
        self.processing.store(processing, Ordering::Release);
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> TrackerConfig {
    use std::time::Duration;

    TrackerConfig {
        max_address_number: 4,
        max_transaction_number: 3,
        max_concurrent_workers: 2,
        poll_interval: Duration::from_millis(10),
        block_number_query_timeout: Duration::from_secs(1),
        transactions_query_timeout: Duration::from_secs(1),
    }
}
