//! The long-running, polling parser.

use crate::{
    executor::{Controller, FetchWorker},
    scheduler::PollScheduler,
    state::Shared,
    Parser, TrackerError,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};
use txwatch_chain::{with_deadline, BlockNumberRequest, ChainAccessor};
use txwatch_config::TrackerConfig;
use txwatch_primitives::{BlockNumber, Transaction};
use txwatch_tasks::{
    shutdown::{signal, Signal},
    TaskSpawner,
};

/// Tracks subscribed addresses by polling the chain in the background.
///
/// Every poll interval the scheduler asks for the chain head. When it moved past the processed
/// block and the previous round has completed, newly subscribed addresses are admitted into the
/// cache and every tracked address is handed to the worker pool, which fetches and merges the
/// transactions of the new block window.
///
/// Queries only read the cache and never wait on the chain. Dropping the parser stops the
/// background tasks.
#[derive(Debug)]
pub struct ServiceParser {
    shared: Arc<Shared>,
    signal: Mutex<Option<Signal>>,
}

impl ServiceParser {
    /// Fetches the chain head and spawns the scheduler, the controller and
    /// [`TrackerConfig::max_concurrent_workers`] workers.
    ///
    /// Fails if the config is invalid or the initial head cannot be fetched.
    pub async fn spawn<C>(
        chain: Arc<C>,
        config: TrackerConfig,
        spawner: &dyn TaskSpawner,
    ) -> Result<Self, TrackerError>
    where
        C: ChainAccessor + 'static,
    {
        config.validate()?;

        let head = with_deadline(
            config.block_number_query_timeout,
            chain.current_block_number(BlockNumberRequest::new()),
        )
        .await
        .map_err(|err| {
            error!(target: "tracker", %err, "failed to fetch initial chain head");
            TrackerError::InitialHead(err)
        })?;
        info!(
            target: "tracker",
            head,
            workers = config.max_concurrent_workers,
            max_addresses = config.max_address_number,
            "starting tracker"
        );

        let shared = Arc::new(Shared::new(head, config));
        let (signal, shutdown) = signal();
        let (task_tx, task_rx) = mpsc::channel(1);
        let (round_tx, round_rx) = mpsc::channel(1);
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let task_rx = Arc::new(tokio::sync::Mutex::new(task_rx));

        for id in 0..config.max_concurrent_workers {
            let worker = FetchWorker::new(
                id,
                chain.clone(),
                shared.clone(),
                task_rx.clone(),
                completion_tx.clone(),
                shutdown.clone(),
            );
            spawner.spawn_critical_task("tracker worker", Box::pin(worker.run()));
        }

        let controller = Controller::new(shared.clone(), round_rx, completion_rx, shutdown.clone());
        spawner.spawn_critical_task("tracker controller", Box::pin(controller.run()));

        let scheduler = PollScheduler::new(chain, shared.clone(), task_tx, round_tx, shutdown);
        spawner.spawn_critical_task("tracker scheduler", Box::pin(scheduler.run()));

        Ok(Self { shared, signal: Mutex::new(Some(signal)) })
    }

    /// Head block of the most recently started round.
    pub fn current_block(&self) -> BlockNumber {
        self.shared.processed_block()
    }

    /// Queues `address` for tracking from the next round on.
    pub fn subscribe(&self, address: impl Into<String>) -> bool {
        self.shared.subscriptions.subscribe(address)
    }

    /// The stored transactions of `address`, newest first, or nothing if it is not tracked.
    ///
    /// Marks the address as recently used.
    pub fn transactions(&self, address: &str) -> Vec<Transaction> {
        self.shared
            .state
            .write()
            .cache
            .get(address)
            .map(|record| record.transactions().to_vec())
            .unwrap_or_default()
    }

    /// Number of tracked addresses.
    pub fn tracked_addresses(&self) -> usize {
        self.shared.state.read().cache.len()
    }

    /// Stops the background tasks. Queries keep answering from the last state.
    pub fn shutdown(&self) {
        if let Some(signal) = self.signal.lock().take() {
            info!(target: "tracker", "stopping tracker");
            signal.fire();
        }
    }
}

#[async_trait]
impl Parser for ServiceParser {
    async fn current_block(&self) -> BlockNumber {
        Self::current_block(self)
    }

    async fn subscribe(&self, address: String) -> bool {
        Self::subscribe(self, address)
    }

    async fn transactions(&self, address: String) -> Vec<Transaction> {
        Self::transactions(self, &address)
    }
}
