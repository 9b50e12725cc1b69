//! Unbounded lock-free SPSC queue with lazy node reclamation.
//!
//! The queue is a singly linked chain of heap nodes with three positions
//! into it:
//!
//! ```text
//!   front                 divider                    back
//!     │                      │                         │
//!     ▼                      ▼                         ▼
//!  [sentinel] ──► [ a ] ──► [ b ] ──► [ c ] ──► [ d ] ──► null
//!  └──── consumed, waiting ───┘      └──── live, not yet popped ────┘
//!        for the producer
//! ```
//!
//! * `front` and `back` belong to the producer.
//! * `divider` is the only cell both sides touch. The consumer moves it
//!   forward on every pop; the producer only reads it.
//! * Nodes strictly before `divider` have been consumed. The producer frees
//!   them on its next push ("lazy deletion"), so memory is never released
//!   under a reader that might still hold it.
//!
//! The two sides are separate handle types, [`Producer`] and [`Consumer`].
//! Neither is `Clone` and both mutate through `&mut self`, so a second
//! producer or consumer cannot be expressed.

use core::fmt;
use core::ptr;

use crate::error::EmptyQueue;
use crate::sync::{Arc, AtomicPtr, CachePadded, Ordering, UnsafeCell};

struct Node<T> {
    value: UnsafeCell<Option<T>>,
    next: AtomicPtr<Node<T>>,
}

impl<T> Node<T> {
    fn alloc(value: Option<T>) -> *mut Node<T> {
        Box::into_raw(Box::new(Node {
            value: UnsafeCell::new(value),
            next: AtomicPtr::new(ptr::null_mut()),
        }))
    }
}

struct Shared<T> {
    divider: CachePadded<AtomicPtr<Node<T>>>,
    // Producer-owned. Lives here so the chain can be freed by whichever
    // half is dropped last.
    front: UnsafeCell<*mut Node<T>>,
}

unsafe impl<T: Send> Send for Shared<T> {}
unsafe impl<T: Send> Sync for Shared<T> {}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        // SAFETY: both halves are gone, nobody else reads `front`.
        let mut node = self.front.with(|front| unsafe { *front });
        while !node.is_null() {
            // SAFETY: both halves are gone; the whole chain from `front` is ours.
            let boxed = unsafe { Box::from_raw(node) };
            node = boxed.next.load(Ordering::Relaxed);
        }
    }
}

/// An unsplit SPSC queue.
///
/// Usable directly from a single thread, or [`split`](SpscQueue::split)
/// into a [`Producer`] and a [`Consumer`] that can be moved to two
/// different threads.
///
/// ```
/// use spsc_pool::SpscQueue;
///
/// let mut queue = SpscQueue::new();
/// queue.push(1);
/// queue.push(2);
/// assert_eq!(queue.pop(), Ok(1));
/// assert_eq!(queue.pop(), Ok(2));
/// assert!(queue.is_empty());
/// ```
pub struct SpscQueue<T> {
    producer: Producer<T>,
    consumer: Consumer<T>,
}

impl<T> SpscQueue<T> {
    /// Create an empty queue holding only the sentinel node.
    pub fn new() -> Self {
        let sentinel = Node::alloc(None);
        let shared = Arc::new(Shared {
            divider: CachePadded::new(AtomicPtr::new(sentinel)),
            front: UnsafeCell::new(sentinel),
        });
        SpscQueue {
            producer: Producer {
                shared: Arc::clone(&shared),
                back: sentinel,
                pushed: 0,
                reclaimed: 0,
            },
            consumer: Consumer { shared, popped: 0 },
        }
    }

    /// Separate the queue into its two halves.
    pub fn split(self) -> (Producer<T>, Consumer<T>) {
        (self.producer, self.consumer)
    }

    /// See [`Producer::push`].
    pub fn push(&mut self, value: T) {
        self.producer.push(value);
    }

    /// See [`Consumer::pop`].
    pub fn pop(&mut self) -> Result<T, EmptyQueue> {
        self.consumer.pop()
    }

    /// True iff nothing is queued past the divider.
    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }
}

impl<T> Default for SpscQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SpscQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpscQueue")
            .field("producer", &self.producer)
            .field("consumer", &self.consumer)
            .finish()
    }
}

/// Create a queue and return its two halves.
pub fn channel<T>() -> (Producer<T>, Consumer<T>) {
    SpscQueue::new().split()
}

/// The writing half of an SPSC queue.
pub struct Producer<T> {
    shared: Arc<Shared<T>>,
    back: *mut Node<T>,
    pushed: u64,
    reclaimed: u64,
}

unsafe impl<T: Send> Send for Producer<T> {}

impl<T> Producer<T> {
    /// Append `value` to the queue, then free every node the consumer has
    /// already moved past. Never blocks and never fails.
    pub fn push(&mut self, value: T) {
        let node = Node::alloc(Some(value));
        // SAFETY: `back` is at or after the divider, so the reclaim pass
        // has not freed it.
        unsafe { (*self.back).next.store(node, Ordering::Release) };
        self.back = node;
        self.pushed += 1;
        self.reclaim();
    }

    /// Run the lazy-delete pass without pushing. Returns how many nodes
    /// were freed.
    pub fn reclaim(&mut self) -> usize {
        let divider = self.shared.divider.load(Ordering::Acquire);
        let freed = self.shared.front.with_mut(|front| {
            // SAFETY: only the producer touches `front` while it is alive.
            let front = unsafe { &mut *front };
            let mut freed = 0;
            while *front != divider {
                // SAFETY: nodes strictly before the divider are consumed and
                // the consumer never walks backwards.
                let node = unsafe { Box::from_raw(*front) };
                *front = node.next.load(Ordering::Relaxed);
                freed += 1;
            }
            freed
        });
        self.reclaimed += freed as u64;
        freed
    }

    /// True iff the consumer has nothing left to pop.
    pub fn is_empty(&self) -> bool {
        let divider = self.shared.divider.load(Ordering::Acquire);
        // SAFETY: only this producer frees nodes, and never the divider.
        unsafe { (*divider).next.load(Ordering::Acquire).is_null() }
    }

    /// Values pushed so far.
    pub fn pushed(&self) -> u64 {
        self.pushed
    }

    /// Nodes freed by the lazy-delete pass so far.
    pub fn reclaimed(&self) -> u64 {
        self.reclaimed
    }

    /// Nodes currently allocated, sentinel included.
    pub fn retained_nodes(&self) -> u64 {
        self.pushed + 1 - self.reclaimed
    }
}

impl<T> fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("pushed", &self.pushed)
            .field("reclaimed", &self.reclaimed)
            .finish()
    }
}

/// The reading half of an SPSC queue.
pub struct Consumer<T> {
    shared: Arc<Shared<T>>,
    popped: u64,
}

impl<T> Consumer<T> {
    /// Take the oldest value.
    ///
    /// Fails with [`EmptyQueue`] when nothing is queued; polling loops are
    /// expected to see this often.
    pub fn pop(&mut self) -> Result<T, EmptyQueue> {
        // Only this consumer writes the divider.
        let divider = self.shared.divider.load(Ordering::Relaxed);
        // SAFETY: the producer never frees the divider node.
        let next = unsafe { (*divider).next.load(Ordering::Acquire) };
        if next.is_null() {
            return Err(EmptyQueue);
        }
        // SAFETY: `next` was fully built before it was linked and the
        // producer never reads its value. The value is moved out before the
        // divider store hands the older node over for reclamation.
        let value = unsafe { (*next).value.with_mut(|slot| (*slot).take()) };
        self.shared.divider.store(next, Ordering::Release);
        self.popped += 1;
        // Every node linked after the sentinel was built with a value.
        value.ok_or(EmptyQueue)
    }

    /// True iff nothing is queued past the divider.
    pub fn is_empty(&self) -> bool {
        let divider = self.shared.divider.load(Ordering::Relaxed);
        // SAFETY: the producer never frees the divider node.
        unsafe { (*divider).next.load(Ordering::Acquire).is_null() }
    }

    /// Values popped so far.
    pub fn popped(&self) -> u64 {
        self.popped
    }

    /// Iterate over everything currently queued without waiting for more.
    pub fn try_iter(&mut self) -> TryIter<'_, T> {
        TryIter { consumer: self }
    }
}

impl<T> fmt::Debug for Consumer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("popped", &self.popped)
            .finish()
    }
}

/// Iterator returned by [`Consumer::try_iter`]. Stops at the first empty
/// poll.
#[derive(Debug)]
pub struct TryIter<'a, T> {
    consumer: &'a mut Consumer<T>,
}

impl<T> Iterator for TryIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.consumer.pop().ok()
    }
}
