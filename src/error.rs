//! Error types.

use std::io;

use thiserror::Error;

/// Returned by [`Consumer::pop`](crate::Consumer::pop) when nothing is
/// queued past the divider.
///
/// This is the normal "nothing to do yet" signal of a polling loop, not a
/// failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("queue is empty")]
pub struct EmptyQueue;

/// Errors raised while setting up or tearing down a worker pool.
#[derive(Error, Debug)]
pub enum PoolError {
    /// The pool configuration cannot describe a runnable topology.
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),

    /// The OS refused to start a worker thread.
    #[error("failed to spawn worker {worker}: {source}")]
    Spawn {
        /// Index of the worker that could not be started.
        worker: usize,
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },

    /// A worker thread panicked before it observed `Exit`.
    #[error("worker {worker} panicked")]
    WorkerPanicked {
        /// Index of the panicked worker.
        worker: usize,
    },
}
