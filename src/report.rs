//! Run summaries and their text rendering.

use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

use crate::worker::WorkerStats;

/// How a run was executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Worker pool over SPSC queues.
    Threaded,
    /// Everything on the calling thread, for comparison.
    Reference,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Threaded => f.write_str("threaded"),
            RunMode::Reference => f.write_str("reference"),
        }
    }
}

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Execution mode
    pub mode: RunMode,
    /// Worker count the item range was sized for
    pub workers: usize,
    /// Rounds submitted
    pub rounds: usize,
    /// Items per batch
    pub batch_size: usize,
    /// Per-item cost of the workload that ran
    pub delay: Duration,
    /// Items evaluated
    pub items_checked: u64,
    /// Accepted items, in the order they were collected
    pub matches: Vec<u64>,
    /// Batches pushed (zero for reference runs)
    pub sent: u64,
    /// Messages drained (zero for reference runs)
    pub received: u64,
    /// Per-worker counters, indexed by worker id (empty for reference runs)
    pub worker_stats: Vec<WorkerStats>,
    /// Wall time of the whole run
    pub elapsed: Duration,
    /// Time spent spawning, pushing and draining, settle and poll sleeps
    /// excluded (the whole run for reference runs)
    pub busy: Duration,
}

impl RunReport {
    /// Number of accepted items.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// One-line summary for the console.
    pub fn summary(&self) -> String {
        format!(
            "{} run: {} matches from {} items in {:?}",
            self.mode,
            self.match_count(),
            self.items_checked,
            self.elapsed
        )
    }

    /// Write the full report: parameters, per-worker counters, every match,
    /// then the totals.
    pub fn write_to<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "mode: {}", self.mode)?;
        writeln!(
            out,
            "{} workers : {} per batch : {} rounds : {:?} per item",
            self.workers, self.batch_size, self.rounds, self.delay
        )?;
        if self.mode == RunMode::Threaded {
            writeln!(out, "sent {} batches, received {} messages", self.sent, self.received)?;
            for (id, stats) in self.worker_stats.iter().enumerate() {
                writeln!(
                    out,
                    "worker {id}: {} batches, {} items, {} accepted, {} ignored",
                    stats.batches, stats.items, stats.accepted, stats.ignored
                )?;
            }
        }
        for item in &self.matches {
            writeln!(out, "{item}")?;
        }
        writeln!(
            out,
            "ALL DONE found {} matches from {} items",
            self.match_count(),
            self.items_checked
        )?;
        writeln!(out, "Total time: {:?}", self.elapsed)?;
        writeln!(out, "Busy time: {:?}", self.busy)?;
        out.flush()
    }
}
