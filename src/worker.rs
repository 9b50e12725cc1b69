//! Worker loop bound to one inbound and one outbound queue.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::config::DEFAULT_BATCH_SIZE;
use crate::message::{Items, Message};
use crate::queue::{Consumer, Producer};
use crate::sync::Backoff;
use crate::workload::Workload;

/// Lifecycle of a worker. `Terminated` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Polling its inbound queue.
    Running,
    /// Observed `Exit`; reads nothing further.
    Terminated,
}

/// Counters a worker hands back when its thread returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// `Batch` messages processed
    pub batches: u64,
    /// Items evaluated across all batches
    pub items: u64,
    /// Items the workload accepted
    pub accepted: u64,
    /// Inbound messages that were not `Batch` or `Exit`
    pub ignored: u64,
}

/// Consumes messages from `inbound`, answers every `Batch` with one
/// `Results` on `outbound`, and stops at `Exit`.
///
/// A worker has no error path: it either does work or terminates.
pub struct Worker<W, const N: usize = DEFAULT_BATCH_SIZE> {
    id: usize,
    inbound: Consumer<Message<N>>,
    outbound: Producer<Message<N>>,
    workload: Arc<W>,
    state: WorkerState,
    stats: WorkerStats,
}

impl<W: Workload, const N: usize> Worker<W, N> {
    /// Bind a worker to its queue halves.
    pub fn new(
        id: usize,
        inbound: Consumer<Message<N>>,
        outbound: Producer<Message<N>>,
        workload: Arc<W>,
    ) -> Self {
        Self {
            id,
            inbound,
            outbound,
            workload,
            state: WorkerState::Running,
            stats: WorkerStats::default(),
        }
    }

    /// Worker index within its pool.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Current state.
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Counters so far.
    pub fn stats(&self) -> WorkerStats {
        self.stats
    }

    /// Poll until `Exit` is observed, spinning while the inbound queue is
    /// empty. Returns the final counters.
    pub fn run(mut self) -> WorkerStats {
        let mut backoff = Backoff::new();
        while self.state == WorkerState::Running {
            if self.poll() {
                backoff.reset();
            } else {
                backoff.snooze();
            }
        }
        debug!(
            worker = self.id,
            batches = self.stats.batches,
            items = self.stats.items,
            accepted = self.stats.accepted,
            "worker terminated"
        );
        self.stats
    }

    /// Handle at most one inbound message. Returns `false` if there was
    /// nothing to read or the worker has already terminated.
    pub fn poll(&mut self) -> bool {
        if self.state == WorkerState::Terminated {
            return false;
        }
        match self.inbound.pop() {
            Ok(message) => {
                self.handle(message);
                true
            }
            Err(_) => false,
        }
    }

    fn handle(&mut self, message: Message<N>) {
        match message {
            Message::Batch(items) => {
                let mut accepted = Items::<N>::new();
                for &item in &items {
                    if self.workload.accept(item) {
                        // Never more than the batch it came from.
                        accepted.push(item);
                    }
                }
                self.stats.batches += 1;
                self.stats.items += items.len() as u64;
                self.stats.accepted += accepted.len() as u64;
                trace!(
                    worker = self.id,
                    items = items.len(),
                    accepted = accepted.len(),
                    "batch processed"
                );
                self.outbound.push(Message::Results(accepted));
            }
            Message::Exit => {
                trace!(worker = self.id, "exit received");
                self.state = WorkerState::Terminated;
            }
            other => {
                warn!(worker = self.id, kind = other.kind(), "ignoring unexpected message");
                self.stats.ignored += 1;
            }
        }
    }
}
