//! Pool configuration

use std::time::Duration;

use crate::error::PoolError;

/// Default batch capacity, in items.
pub const DEFAULT_BATCH_SIZE: usize = 1024;
/// Default number of worker threads.
pub const DEFAULT_WORKERS: usize = 2;
/// Default number of submission rounds.
pub const DEFAULT_ROUNDS: usize = 20;
/// Default simulated cost of one item.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1);

/// Runtime parameters of a pool run.
///
/// None of these affect queue or worker correctness, only throughput.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of worker threads (and queue pairs)
    pub workers: usize,
    /// Number of submission rounds
    pub rounds: usize,
    /// Per-item cost of the prime workload [`Orchestrator::run`] builds
    ///
    /// [`Orchestrator::run`]: crate::Orchestrator::run
    pub delay: Duration,
    /// Sleep between submitting a round and draining it
    pub settle: Duration,
    /// Sleep between drains while waiting for completion
    pub poll_interval: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            rounds: DEFAULT_ROUNDS,
            delay: DEFAULT_DELAY,
            settle: Duration::from_millis(1),
            poll_interval: Duration::from_millis(1),
        }
    }
}

impl PoolConfig {
    /// Create a builder for pool configuration
    pub fn builder() -> PoolConfigBuilder {
        PoolConfigBuilder::new()
    }

    /// Reject topologies that cannot run.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.workers == 0 {
            return Err(PoolError::InvalidConfig(
                "at least one worker is required".into(),
            ));
        }
        Ok(())
    }

    /// Items evaluated by a full run with batches of `batch_size`.
    pub fn total_items(&self, batch_size: usize) -> u64 {
        (self.workers as u64) * (self.rounds as u64) * (batch_size as u64)
    }
}

/// Builder for pool configuration
#[derive(Debug, Clone, Default)]
pub struct PoolConfigBuilder {
    config: PoolConfig,
}

impl PoolConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: PoolConfig::default(),
        }
    }

    /// Set number of workers
    pub fn workers(mut self, n: usize) -> Self {
        self.config.workers = n;
        self
    }

    /// Set number of rounds
    pub fn rounds(mut self, n: usize) -> Self {
        self.config.rounds = n;
        self
    }

    /// Set per-item delay
    pub fn delay(mut self, delay: Duration) -> Self {
        self.config.delay = delay;
        self
    }

    /// Set the settle sleep after each round
    pub fn settle(mut self, settle: Duration) -> Self {
        self.config.settle = settle;
        self
    }

    /// Set the completion poll interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Build the configuration
    pub fn build(self) -> PoolConfig {
        self.config
    }
}
