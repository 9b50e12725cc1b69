//! Synchronization primitives shared by the queue and the worker loop.
//!
//! Under `--cfg loom` the atomics, `Arc` and `UnsafeCell` come from `loom`
//! so the queue protocol can be model checked; otherwise they are the
//! `std` types. Cell contents are reached only through `with`/`with_mut`,
//! which is the access API loom can track.

#[cfg(loom)]
pub(crate) use loom::sync::atomic::{AtomicPtr, Ordering};
#[cfg(loom)]
pub(crate) use loom::cell::UnsafeCell;
#[cfg(loom)]
pub(crate) use loom::sync::Arc;

#[cfg(not(loom))]
pub(crate) use std::sync::atomic::{AtomicPtr, Ordering};
#[cfg(not(loom))]
pub(crate) use std::sync::Arc;

use std::ops::Deref;
use std::thread;

/// `core::cell::UnsafeCell` behind the closure API of `loom::cell::UnsafeCell`.
#[cfg(not(loom))]
pub(crate) struct UnsafeCell<T>(core::cell::UnsafeCell<T>);

#[cfg(not(loom))]
impl<T> UnsafeCell<T> {
    pub(crate) const fn new(data: T) -> Self {
        UnsafeCell(core::cell::UnsafeCell::new(data))
    }

    #[inline(always)]
    pub(crate) fn with<R>(&self, f: impl FnOnce(*const T) -> R) -> R {
        f(self.0.get())
    }

    #[inline(always)]
    pub(crate) fn with_mut<R>(&self, f: impl FnOnce(*mut T) -> R) -> R {
        f(self.0.get())
    }
}

/// Keeps the wrapped value on its own cache line.
#[repr(align(64))]
pub(crate) struct CachePadded<T> {
    value: T,
}

impl<T> CachePadded<T> {
    pub(crate) const fn new(value: T) -> Self {
        CachePadded { value }
    }
}

impl<T> Deref for CachePadded<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

const SPIN_LIMIT: u32 = 64;

/// Spin a bit, then start yielding to the scheduler.
///
/// Never sleeps: callers that want a bounded sleep between polls do that
/// themselves.
#[derive(Debug, Default)]
pub(crate) struct Backoff {
    spins: u32,
}

impl Backoff {
    pub(crate) const fn new() -> Self {
        Backoff { spins: 0 }
    }

    #[inline(always)]
    pub(crate) fn snooze(&mut self) {
        if self.spins < SPIN_LIMIT {
            self.spins += 1;
            core::hint::spin_loop();
        } else {
            thread::yield_now();
        }
    }

    #[inline(always)]
    pub(crate) fn reset(&mut self) {
        self.spins = 0;
    }
}
