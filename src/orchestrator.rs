//! Fixed-topology pool driver.
//!
//! The orchestrator owns one `(inbound, outbound)` queue pair and one
//! thread per worker. It submits rounds of batches, drains results and uses
//! the `sent == received` counter pair as its only completion oracle.
//!
//! ```text
//!                 ┌──── Batch / Exit ────► inbound[i] ────┐
//!  Orchestrator ──┤                                        ├── Worker i
//!                 └◄──── Results ────────  outbound[i] ◄───┘
//! ```
//!
//! Workers are only joined after `Exit` has been pushed to them, both in
//! [`Orchestrator::shutdown`] and when the orchestrator is dropped.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{PoolConfig, DEFAULT_BATCH_SIZE};
use crate::error::PoolError;
use crate::message::Message;
use crate::queue::{channel, Consumer, Producer};
use crate::report::{RunMode, RunReport};
use crate::stopwatch::{PausableStopwatch, Stopwatch};
use crate::worker::{Worker, WorkerStats};
use crate::workload::{PrimeWorkload, Workload};

struct WorkerHandle<const N: usize> {
    id: usize,
    inbound: Producer<Message<N>>,
    outbound: Consumer<Message<N>>,
    thread: Option<JoinHandle<WorkerStats>>,
}

impl<const N: usize> WorkerHandle<N> {
    fn spawn<W: Workload>(id: usize, workload: Arc<W>) -> Result<Self, PoolError> {
        let (inbound, worker_rx) = channel();
        let (worker_tx, outbound) = channel();
        let worker = Worker::<W, N>::new(id, worker_rx, worker_tx, workload);
        let thread = thread::Builder::new()
            .name(format!("worker-{id}"))
            .spawn(move || worker.run())
            .map_err(|source| PoolError::Spawn { worker: id, source })?;
        Ok(Self {
            id,
            inbound,
            outbound,
            thread: Some(thread),
        })
    }
}

/// Drives a fixed set of workers through rounds of batch submission.
///
/// `N` is the batch capacity; every submitted batch is full.
pub struct Orchestrator<const N: usize = DEFAULT_BATCH_SIZE> {
    config: PoolConfig,
    workers: Vec<WorkerHandle<N>>,
    sent: u64,
    received: u64,
    next_item: u64,
    rounds_submitted: usize,
    matches: Vec<u64>,
    delay: Duration,
    clock: Stopwatch,
    // Runs only while spawning, pushing or draining.
    busy: PausableStopwatch,
}

impl<const N: usize> Orchestrator<N> {
    /// Validate `config` and start one thread per worker.
    ///
    /// If a later worker fails to start, the ones already running are shut
    /// down before the error is returned.
    pub fn spawn<W: Workload>(config: PoolConfig, workload: W) -> Result<Self, PoolError> {
        config.validate()?;
        if N == 0 {
            return Err(PoolError::InvalidConfig("batch capacity must be > 0".into()));
        }

        let clock = Stopwatch::start();
        let busy = PausableStopwatch::start();
        let delay = workload.item_cost();
        let workload = Arc::new(workload);
        let mut pool = Self {
            workers: Vec::with_capacity(config.workers),
            config,
            sent: 0,
            received: 0,
            next_item: 0,
            rounds_submitted: 0,
            matches: Vec::new(),
            delay,
            clock,
            busy,
        };
        for id in 0..pool.config.workers {
            pool.workers.push(WorkerHandle::spawn(id, Arc::clone(&workload))?);
        }
        pool.busy.stop();
        debug!(
            workers = pool.workers.len(),
            elapsed = ?pool.clock.elapsed(),
            "workers spawned"
        );
        Ok(pool)
    }

    /// The configuration the pool was started with.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Batches pushed so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Messages drained so far.
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Accepted items drained so far, in arrival order.
    pub fn matches(&self) -> &[u64] {
        &self.matches
    }

    /// Per-item cost of the workload the workers apply.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether every pushed batch has been answered.
    pub fn is_complete(&self) -> bool {
        self.sent == self.received
    }

    /// Push one full batch of sequential items to every worker.
    pub fn submit_round(&mut self) {
        self.busy.resume();
        let watch = Stopwatch::start();
        for handle in &mut self.workers {
            let start = self.next_item;
            handle.inbound.push(Message::sequential(start, N));
            self.next_item += N as u64;
            self.sent += 1;
            debug!(worker = handle.id, start, "batch submitted");
        }
        self.rounds_submitted += 1;
        self.busy.stop();
        debug!(
            round = self.rounds_submitted,
            elapsed = ?watch.elapsed(),
            "round pushed"
        );
    }

    /// Pop everything currently waiting on the outbound queues. Returns the
    /// number of messages drained.
    pub fn drain(&mut self) -> usize {
        self.busy.resume();
        let mut drained = 0;
        for handle in &mut self.workers {
            for message in handle.outbound.try_iter() {
                // Every message counts toward the oracle, empty results too.
                self.received += 1;
                drained += 1;
                match message {
                    Message::Results(items) => self.matches.extend_from_slice(&items),
                    other => {
                        warn!(worker = handle.id, kind = other.kind(), "unexpected message from worker")
                    }
                }
            }
        }
        self.busy.stop();
        drained
    }

    /// Drain and sleep until `sent == received`.
    ///
    /// Terminates as long as every worker keeps running; there is no time
    /// bound. Workers only return after `Exit`, so a worker thread that has
    /// finished before completion has panicked and its batches will never
    /// be answered.
    pub fn wait_for_completion(&mut self) -> Result<(), PoolError> {
        let watch = Stopwatch::start();
        loop {
            self.drain();
            if self.is_complete() {
                break;
            }
            if let Some(dead) = self.workers.iter().find(|h| {
                h.thread.as_ref().map_or(false, JoinHandle::is_finished)
            }) {
                return Err(PoolError::WorkerPanicked { worker: dead.id });
            }
            thread::sleep(self.config.poll_interval);
        }
        debug!(
            sent = self.sent,
            received = self.received,
            elapsed = ?watch.elapsed(),
            "all batches answered"
        );
        Ok(())
    }

    /// Run every configured round: submit, settle, drain. Finishes with the
    /// completion barrier.
    pub fn run_rounds(&mut self) -> Result<(), PoolError> {
        let mut watch = Stopwatch::start();
        for round in 0..self.config.rounds {
            watch.reset();
            self.submit_round();
            settle(self.config.settle);
            let drained = self.drain();
            debug!(round, drained, elapsed = ?watch.elapsed(), "round drained");
        }
        self.wait_for_completion()
    }

    /// Complete outstanding work, send `Exit` to every worker, then join
    /// them all.
    pub fn shutdown(mut self) -> Result<RunReport, PoolError> {
        self.wait_for_completion()?;
        let stats = self.stop_workers()?;
        let report = RunReport {
            mode: RunMode::Threaded,
            workers: self.config.workers,
            rounds: self.rounds_submitted,
            batch_size: N,
            delay: self.delay,
            items_checked: self.next_item,
            matches: std::mem::take(&mut self.matches),
            sent: self.sent,
            received: self.received,
            worker_stats: stats,
            elapsed: self.clock.elapsed(),
            busy: self.busy.elapsed(),
        };
        info!(
            matches = report.matches.len(),
            items = report.items_checked,
            elapsed = ?report.elapsed,
            busy = ?report.busy,
            "pool shut down"
        );
        Ok(report)
    }

    /// Run the prime workload with `config.delay` per item.
    pub fn run(config: PoolConfig) -> Result<RunReport, PoolError> {
        let workload = PrimeWorkload::new(config.delay);
        Self::run_with(config, workload)
    }

    /// Spawn a pool applying `workload`, run every round and shut it down.
    /// `config.delay` is not used; the report carries the workload's own
    /// [`item_cost`](Workload::item_cost).
    pub fn run_with<W: Workload>(config: PoolConfig, workload: W) -> Result<RunReport, PoolError> {
        info!(
            workers = config.workers,
            rounds = config.rounds,
            batch_size = N,
            delay = ?workload.item_cost(),
            "starting threaded run"
        );
        let mut pool = Self::spawn(config, workload)?;
        pool.run_rounds()?;
        pool.shutdown()
    }

    // Exit first, join second. Keeps joining after a panicked worker so no
    // thread is left behind, then reports the first panic.
    fn stop_workers(&mut self) -> Result<Vec<WorkerStats>, PoolError> {
        for handle in &mut self.workers {
            if handle.thread.is_some() {
                handle.inbound.push(Message::Exit);
            }
        }
        let mut stats = Vec::with_capacity(self.workers.len());
        let mut first_panic = None;
        for handle in &mut self.workers {
            let Some(thread) = handle.thread.take() else {
                continue;
            };
            match thread.join() {
                Ok(worker_stats) => stats.push(worker_stats),
                Err(_) => {
                    warn!(worker = handle.id, "worker panicked");
                    if first_panic.is_none() {
                        first_panic = Some(PoolError::WorkerPanicked { worker: handle.id });
                    }
                }
            }
        }
        match first_panic {
            Some(err) => Err(err),
            None => Ok(stats),
        }
    }
}

impl<const N: usize> Drop for Orchestrator<N> {
    fn drop(&mut self) {
        if self.workers.iter().any(|h| h.thread.is_some()) {
            debug!("orchestrator dropped with live workers, stopping them");
            if let Err(err) = self.stop_workers() {
                warn!(%err, "error while stopping workers");
            }
        }
    }
}

fn settle(duration: Duration) {
    if duration.is_zero() {
        thread::yield_now();
    } else {
        thread::sleep(duration);
    }
}
