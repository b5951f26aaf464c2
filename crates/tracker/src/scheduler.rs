//! Periodic chain head polling and round dispatch.

use crate::{cache::AddressRecord, executor::FetchTask, state::Shared};
use std::sync::Arc;
use tokio::{sync::mpsc, time::MissedTickBehavior};
use tracing::{debug, info, trace, warn};
use txwatch_chain::{with_deadline, BlockNumberRequest, ChainAccessor};
use txwatch_primitives::BlockNumber;
use txwatch_tasks::shutdown::Shutdown;

/// Result of a single scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    /// The head query failed or timed out.
    HeadUnavailable,
    /// The head has not moved past the processed block.
    NoNewBlock { head: BlockNumber },
    /// A new head was seen while the previous round is still running. It is picked up by a later
    /// tick once that round completes.
    RoundInFlight { processed: BlockNumber, head: BlockNumber },
    /// The head advanced but nothing is tracked.
    NoAddresses { head: BlockNumber },
    /// A round was announced and one task per tracked address was queued.
    Dispatched { head: BlockNumber, tasks: usize },
    /// Shutdown fired or the pipeline is gone.
    Shutdown,
}

/// Polls the chain head and starts a round whenever it advances and no round is in flight.
#[derive(Debug)]
pub(crate) struct PollScheduler<C> {
    chain: Arc<C>,
    shared: Arc<Shared>,
    tasks: mpsc::Sender<FetchTask>,
    rounds: mpsc::Sender<usize>,
    shutdown: Shutdown,
}

impl<C: ChainAccessor> PollScheduler<C> {
    pub(crate) fn new(
        chain: Arc<C>,
        shared: Arc<Shared>,
        tasks: mpsc::Sender<FetchTask>,
        rounds: mpsc::Sender<usize>,
        shutdown: Shutdown,
    ) -> Self {
        Self { chain, shared, tasks, rounds, shutdown }
    }

    pub(crate) async fn run(mut self) {
        let period = self.shared.config.poll_interval;
        info!(target: "tracker::scheduler", ?period, "scheduler started");

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately, polling starts one period after startup
        interval.tick().await;

        let mut shutdown = self.shutdown.clone();
        loop {
            tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                _ = interval.tick() => {
                    if self.tick().await == TickOutcome::Shutdown {
                        break
                    }
                }
            }
        }

        info!(target: "tracker::scheduler", "scheduler stopped");
    }

    pub(crate) async fn tick(&mut self) -> TickOutcome {
        let request = BlockNumberRequest::new();
        let request_id = request.request_id.clone();
        let timeout = self.shared.config.block_number_query_timeout;
        let head = match with_deadline(timeout, self.chain.current_block_number(request)).await {
            Ok(head) => head,
            Err(err) => {
                warn!(
                    target: "tracker::scheduler",
                    %request_id,
                    %err,
                    "failed to fetch chain head"
                );
                return TickOutcome::HeadUnavailable
            }
        };

        let processed = self.shared.processed_block();
        if head <= processed {
            trace!(target: "tracker::scheduler", head, processed, "no new block");
            return TickOutcome::NoNewBlock { head }
        }
        if self.shared.is_processing() {
            debug!(target: "tracker::scheduler", head, processed, "previous round in flight");
            return TickOutcome::RoundInFlight { processed, head }
        }

        let admitted = self.shared.subscriptions.drain();
        let addresses = {
            let mut state = self.shared.state.write();
            state.processed_block = head;
            for address in admitted {
                trace!(target: "tracker::scheduler", %address, head, "admitting address");
                if let Some(evicted) = state.cache.put(AddressRecord::new(address, head)) {
                    debug!(
                        target: "tracker::scheduler",
                        address = %evicted.address(),
                        "evicted address"
                    );
                }
            }
            state.cache.snapshot()
        };

        if addresses.is_empty() {
            debug!(target: "tracker::scheduler", head, "no addresses tracked");
            return TickOutcome::NoAddresses { head }
        }

        let tasks = addresses.len();
        info!(target: "tracker::scheduler", processed, head, tasks, "starting round");
        self.shared.set_processing(true);

        let mut shutdown = self.shutdown.clone();
        tokio::select! {
            biased;
            _ = shutdown.wait() => return TickOutcome::Shutdown,
            res = self.rounds.send(tasks) => {
                if res.is_err() {
                    return TickOutcome::Shutdown
                }
            }
        }
        for address in addresses {
            let task = FetchTask { address, target_block: head };
            tokio::select! {
                biased;
                _ = shutdown.wait() => return TickOutcome::Shutdown,
                res = self.tasks.send(task) => {
                    if res.is_err() {
                        return TickOutcome::Shutdown
                    }
                }
            }
        }

        TickOutcome::Dispatched { head, tasks }
    }
}
