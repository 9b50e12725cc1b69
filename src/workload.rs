//! Per-item work applied by the workers.

use std::thread;
use std::time::Duration;

/// Decides whether a work item goes into the `Results` of its batch.
///
/// Shared by every worker thread, so it must be `Sync`. Implemented for
/// plain closures as well.
pub trait Workload: Send + Sync + 'static {
    /// Evaluate one item.
    fn accept(&self, item: u64) -> bool;

    /// Simulated cost `accept` spends on every item. Reported in run
    /// summaries; zero unless the workload sleeps on purpose.
    fn item_cost(&self) -> Duration {
        Duration::ZERO
    }
}

impl<F> Workload for F
where
    F: Fn(u64) -> bool + Send + Sync + 'static,
{
    fn accept(&self, item: u64) -> bool {
        self(item)
    }
}

/// Trial division over 6k ± 1.
pub fn is_prime(n: u64) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i = 5u64;
    while i <= n / i {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// Block the calling thread for roughly `delay`. Zero returns at once.
pub fn simulate_cost(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

/// Prime test with an artificial per-item cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrimeWorkload {
    delay: Duration,
}

impl PrimeWorkload {
    /// Prime test that sleeps `delay` before every item.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Per-item delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Workload for PrimeWorkload {
    fn accept(&self, item: u64) -> bool {
        simulate_cost(self.delay);
        is_prime(item)
    }

    fn item_cost(&self) -> Duration {
        self.delay
    }
}
