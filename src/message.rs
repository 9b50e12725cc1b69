//! Messages exchanged between the orchestrator and its workers.

use arrayvec::ArrayVec;

use crate::config::DEFAULT_BATCH_SIZE;

/// Fixed-capacity buffer of work items. Never reallocates.
pub type Items<const N: usize> = ArrayVec<u64, N>;

/// One unit of traffic on a worker queue.
///
/// `Batch` and `Exit` travel from the orchestrator to a worker; `Results`
/// travels back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message<const N: usize = DEFAULT_BATCH_SIZE> {
    /// Items for a worker to evaluate.
    Batch(Items<N>),
    /// The items of one batch that the workload accepted, in batch order.
    /// Pushed even when empty.
    Results(Items<N>),
    /// Stop the worker. Carries nothing.
    Exit,
}

impl<const N: usize> Message<N> {
    /// A `Batch` holding `start, start + 1, ...` up to `len` items, clamped
    /// to the batch capacity `N`.
    pub fn sequential(start: u64, len: usize) -> Self {
        Message::Batch((start..).take(len.min(N)).collect())
    }

    /// Build a `Batch` from a slice. Items past capacity `N` are dropped;
    /// returns how many were kept alongside the message.
    pub fn batch_from(items: &[u64]) -> (Self, usize) {
        let kept = items.len().min(N);
        let mut batch = Items::new();
        // `kept` never exceeds the capacity.
        batch.extend(items[..kept].iter().copied());
        (Message::Batch(batch), kept)
    }

    /// Number of items carried. Zero for `Exit`.
    pub fn count(&self) -> usize {
        match self {
            Message::Batch(items) | Message::Results(items) => items.len(),
            Message::Exit => 0,
        }
    }

    /// Item payload, if the message has one.
    pub fn items(&self) -> Option<&[u64]> {
        match self {
            Message::Batch(items) | Message::Results(items) => Some(items.as_slice()),
            Message::Exit => None,
        }
    }

    /// Short tag used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Batch(_) => "batch",
            Message::Results(_) => "results",
            Message::Exit => "exit",
        }
    }
}
