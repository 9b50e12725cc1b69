//! Single-threaded reference run.
//!
//! Evaluates exactly the item range a threaded run with the same
//! configuration would cover, on the calling thread, so the two can be
//! compared for both results and elapsed time.

use tracing::info;

use crate::config::PoolConfig;
use crate::report::{RunMode, RunReport};
use crate::stopwatch::Stopwatch;
use crate::workload::Workload;

/// Apply `workload` to `0..config.total_items(batch_size)` in order.
pub fn run_reference<W: Workload>(config: &PoolConfig, batch_size: usize, workload: &W) -> RunReport {
    let total = config.total_items(batch_size);
    info!(items = total, delay = ?workload.item_cost(), "starting reference run");

    let clock = Stopwatch::start();
    let matches: Vec<u64> = (0..total).filter(|&item| workload.accept(item)).collect();
    let elapsed = clock.elapsed();

    info!(matches = matches.len(), ?elapsed, "reference run done");
    RunReport {
        mode: RunMode::Reference,
        workers: config.workers,
        rounds: config.rounds,
        batch_size,
        delay: workload.item_cost(),
        items_checked: total,
        matches,
        sent: 0,
        received: 0,
        worker_stats: Vec::new(),
        elapsed,
        busy: elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::PrimeWorkload;
    use std::time::Duration;

    #[test]
    fn covers_the_threaded_item_range() {
        let config = PoolConfig::builder()
            .workers(2)
            .rounds(1)
            .delay(Duration::ZERO)
            .build();
        let report = run_reference(&config, 4, &PrimeWorkload::default());
        assert_eq!(report.items_checked, 8);
        assert_eq!(report.matches, vec![2, 3, 5, 7]);
        assert_eq!(report.mode, RunMode::Reference);
        assert!(report.worker_stats.is_empty());
        assert_eq!(report.busy, report.elapsed);
    }

    #[test]
    fn reports_the_workload_delay() {
        // The configured delay only sizes the CLI's workload; the report
        // follows the workload that actually ran.
        let config = PoolConfig::builder().workers(1).rounds(1).build();
        let report = run_reference(&config, 2, &PrimeWorkload::new(Duration::from_millis(5)));
        assert_eq!(report.delay, Duration::from_millis(5));
        assert!(report.elapsed >= Duration::from_millis(10));

        let report = run_reference(&config, 2, &|n: u64| n > 0);
        assert_eq!(report.delay, Duration::ZERO);
        assert_eq!(report.matches, vec![1]);
    }

    #[test]
    fn prime_count_below_ten_thousand() {
        let config = PoolConfig::builder()
            .workers(1)
            .rounds(10)
            .delay(Duration::ZERO)
            .build();
        let report = run_reference(&config, 1000, &PrimeWorkload::default());
        assert_eq!(report.match_count(), 1229);
    }
}
