//! spsc_pool - fixed-topology worker pool over lock-free SPSC queues
//!
//! Every worker owns one inbound and one outbound [`SpscQueue`]. The
//! [`Orchestrator`] pushes fixed-capacity batches in rounds, drains the
//! results and knows it is done when `sent == received`. Workers stop on an
//! explicit [`Message::Exit`].
//!
//! The queue is an unbounded linked list with a single shared `divider`
//! cell: the consumer advances it, the producer frees nodes behind it on
//! its next push.
//!
//! ```
//! use std::time::Duration;
//! use spsc_pool::{Orchestrator, PoolConfig};
//!
//! let config = PoolConfig::builder()
//!     .workers(2)
//!     .rounds(1)
//!     .delay(Duration::ZERO)
//!     .settle(Duration::ZERO)
//!     .build();
//! let report = Orchestrator::<4>::run(config).unwrap();
//! assert_eq!(report.match_count(), 4); // 2, 3, 5, 7
//! ```
#![warn(missing_docs)]

pub mod config;
mod error;
pub mod message;
pub mod orchestrator;
pub mod queue;
pub mod reference;
pub mod report;
pub mod stopwatch;
mod sync;
pub mod worker;
pub mod workload;

pub use config::{PoolConfig, PoolConfigBuilder, DEFAULT_BATCH_SIZE};
pub use error::{EmptyQueue, PoolError};
pub use message::{Items, Message};
pub use orchestrator::Orchestrator;
pub use queue::{channel, Consumer, Producer, SpscQueue, TryIter};
pub use reference::run_reference;
pub use report::{RunMode, RunReport};
pub use stopwatch::{PausableStopwatch, Stopwatch};
pub use worker::{Worker, WorkerState, WorkerStats};
pub use workload::{is_prime, simulate_cost, PrimeWorkload, Workload};
