//! Monotonic stopwatches used for run instrumentation.
//!
//! Built on [`Instant`], so wall-clock adjustments never move a reading
//! backwards. Nothing in the pool's completion logic depends on these.

use std::time::{Duration, Instant};

/// Measures time since creation or the last [`reset`](Stopwatch::reset).
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    /// Start measuring now.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Restart from now.
    pub fn reset(&mut self) {
        self.start = Instant::now();
    }

    /// Time since start or last reset.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Stopwatch that can be paused; paused time is not counted.
#[derive(Debug, Clone, Copy)]
pub struct PausableStopwatch {
    elapsed: Duration,
    // `None` while stopped.
    running_since: Option<Instant>,
}

impl PausableStopwatch {
    /// Start running now.
    pub fn start() -> Self {
        Self {
            elapsed: Duration::ZERO,
            running_since: Some(Instant::now()),
        }
    }

    /// Stop counting. No-op if already stopped.
    pub fn stop(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.elapsed += since.elapsed();
        }
    }

    /// Continue counting. No-op if already running.
    pub fn resume(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    /// Counted time, excluding stopped intervals.
    pub fn elapsed(&self) -> Duration {
        match self.running_since {
            Some(since) => self.elapsed + since.elapsed(),
            None => self.elapsed,
        }
    }
}
