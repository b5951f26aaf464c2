//! Addresses waiting to be admitted into the cache.

use parking_lot::Mutex;

/// Holds subscribed addresses until the scheduler admits them at the start of the next round.
///
/// Subscribing never blocks on the cache or on a round in flight. Duplicates are kept, admission
/// ignores addresses that are already tracked.
#[derive(Debug, Default)]
pub struct SubscriptionQueue {
    pending: Mutex<Vec<String>>,
}

impl SubscriptionQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `address` for admission. Always accepted.
    pub fn subscribe(&self, address: impl Into<String>) -> bool {
        self.pending.lock().push(address.into());
        true
    }

    /// Takes every queued address in subscription order, leaving the queue empty.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.pending.lock())
    }

    /// Number of queued addresses.
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}
