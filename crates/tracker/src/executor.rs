//! Workers that fetch transactions and the controller that closes a round.

use crate::{cache::AddressRecord, state::Shared};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, trace, warn};
use txwatch_chain::{with_deadline, ChainAccessor, TransactionsRequest};
use txwatch_primitives::BlockNumber;
use txwatch_tasks::shutdown::Shutdown;

/// Fetch the transactions of one address up to `target_block`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FetchTask {
    pub(crate) address: String,
    pub(crate) target_block: BlockNumber,
}

/// What became of a [`FetchTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FetchOutcome {
    /// The fetched batch was merged into the record.
    Merged {
        /// Number of fetched transactions that were kept.
        kept: usize,
    },
    /// The chain call failed or timed out; the record was left untouched.
    Failed,
    /// The address was evicted before the batch could be merged.
    Evicted,
}

/// Receiving half of the task queue, shared by every worker.
pub(crate) type TaskReceiver = Arc<Mutex<mpsc::Receiver<FetchTask>>>;

/// Takes tasks off the shared queue and reports exactly one [`FetchOutcome`] per task.
#[derive(Debug)]
pub(crate) struct FetchWorker<C> {
    id: usize,
    chain: Arc<C>,
    shared: Arc<Shared>,
    tasks: TaskReceiver,
    completions: mpsc::UnboundedSender<FetchOutcome>,
    shutdown: Shutdown,
}

impl<C: ChainAccessor> FetchWorker<C> {
    pub(crate) fn new(
        id: usize,
        chain: Arc<C>,
        shared: Arc<Shared>,
        tasks: TaskReceiver,
        completions: mpsc::UnboundedSender<FetchOutcome>,
        shutdown: Shutdown,
    ) -> Self {
        Self { id, chain, shared, tasks, completions, shutdown }
    }

    pub(crate) async fn run(self) {
        let mut shutdown = self.shutdown.clone();
        trace!(target: "tracker::worker", worker = self.id, "worker started");

        loop {
            let task = {
                let mut tasks = tokio::select! {
                    biased;
                    _ = shutdown.wait() => break,
                    tasks = self.tasks.lock() => tasks,
                };
                tokio::select! {
                    biased;
                    _ = shutdown.wait() => break,
                    task = tasks.recv() => task,
                }
            };
            let Some(task) = task else { break };

            let outcome = self.execute(&task).await;
            if self.completions.send(outcome).is_err() {
                break
            }
        }

        trace!(target: "tracker::worker", worker = self.id, "worker stopped");
    }

    async fn execute(&self, task: &FetchTask) -> FetchOutcome {
        let last_processed_block = self
            .shared
            .state
            .read()
            .cache
            .peek(&task.address)
            .map(AddressRecord::last_processed_block);
        let Some(from_block) = last_processed_block else {
            debug!(
                target: "tracker::worker",
                worker = self.id,
                address = %task.address,
                "address evicted before fetch"
            );
            return FetchOutcome::Evicted
        };

        let request =
            TransactionsRequest::for_address(&task.address, from_block, task.target_block);
        let request_id = request.request_id.clone();
        let timeout = self.shared.config.transactions_query_timeout;
        let fetched =
            match with_deadline(timeout, self.chain.transactions_by_address(request)).await {
                Ok(fetched) => fetched,
                Err(err) => {
                    warn!(
                        target: "tracker::worker",
                        worker = self.id,
                        address = %task.address,
                        from_block,
                        to_block = task.target_block,
                        %request_id,
                        %err,
                        "failed to fetch transactions"
                    );
                    return FetchOutcome::Failed
                }
            };

        let fetched_len = fetched.len();
        let max_transactions = self.shared.config.max_transaction_number;
        let mut state = self.shared.state.write();
        let Some(record) = state.cache.peek_mut(&task.address) else {
            debug!(
                target: "tracker::worker",
                worker = self.id,
                address = %task.address,
                "address evicted during fetch, dropping batch"
            );
            return FetchOutcome::Evicted
        };
        let kept = record.merge(fetched, max_transactions, task.target_block);
        debug!(
            target: "tracker::worker",
            worker = self.id,
            address = %task.address,
            fetched = fetched_len,
            stored = record.transactions().len(),
            block = record.last_processed_block(),
            "merged transactions"
        );
        FetchOutcome::Merged { kept }
    }
}

/// Per-round tally kept by the [`Controller`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RoundSummary {
    pub(crate) merged: usize,
    pub(crate) failed: usize,
    pub(crate) evicted: usize,
    /// Fetched transactions kept across all merges.
    pub(crate) transactions: usize,
}

impl RoundSummary {
    fn record(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Merged { kept } => {
                self.merged += 1;
                self.transactions += kept;
            }
            FetchOutcome::Failed => self.failed += 1,
            FetchOutcome::Evicted => self.evicted += 1,
        }
    }

    fn total(&self) -> usize {
        self.merged + self.failed + self.evicted
    }
}

/// Waits for every task of an announced round to complete, then clears the processing flag so
/// the scheduler may start the next round.
#[derive(Debug)]
pub(crate) struct Controller {
    shared: Arc<Shared>,
    rounds: mpsc::Receiver<usize>,
    completions: mpsc::UnboundedReceiver<FetchOutcome>,
    shutdown: Shutdown,
}

impl Controller {
    pub(crate) fn new(
        shared: Arc<Shared>,
        rounds: mpsc::Receiver<usize>,
        completions: mpsc::UnboundedReceiver<FetchOutcome>,
        shutdown: Shutdown,
    ) -> Self {
        Self { shared, rounds, completions, shutdown }
    }

    pub(crate) async fn run(mut self) {
        let mut shutdown = self.shutdown.clone();

        loop {
            let tasks = tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                tasks = self.rounds.recv() => tasks,
            };
            let Some(tasks) = tasks else { break };
            debug!(target: "tracker::controller", tasks, "awaiting round");

            let Some(summary) = self.await_round(tasks, &mut shutdown).await else { break };
            self.shared.set_processing(false);
            info!(
                target: "tracker::controller",
                tasks,
                merged = summary.merged,
                failed = summary.failed,
                evicted = summary.evicted,
                transactions = summary.transactions,
                "round finished"
            );
        }

        trace!(target: "tracker::controller", "controller stopped");
    }

    /// Returns `None` if shutdown fired or every worker is gone before the round completed.
    async fn await_round(
        &mut self,
        tasks: usize,
        shutdown: &mut Shutdown,
    ) -> Option<RoundSummary> {
        let mut summary = RoundSummary::default();
        while summary.total() < tasks {
            let outcome = tokio::select! {
                biased;
                _ = shutdown.wait() => return None,
                outcome = self.completions.recv() => outcome?,
            };
            summary.record(outcome);
            trace!(
                target: "tracker::controller",
                finished = summary.total(),
                tasks,
                "task finished"
            );
        }
        Some(summary)
    }
}
