//! # SlotQueue
//!
//! `slotq` is a fixed-capacity, blocking, thread safe, Multi Producer Multi
//! Consumer FIFO queue — the classic bounded buffer used to apply
//! backpressure between threads running at different rates.
//!
//! Pushing onto a full queue suspends the calling thread until a consumer
//! frees a slot, and popping from an empty queue suspends it until a
//! producer provides an item. Waiting is condition-variable based: a blocked
//! thread sleeps until the awaited condition can actually hold, rather than
//! re-checking on a timer.
//!
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//!
//! use slotq::SlotQueue;
//!
//! let q = Arc::new(SlotQueue::with_capacity(2).unwrap());
//!
//! let popper = {
//!     let q = q.clone();
//!     thread::spawn(move || q.pop().unwrap())
//! };
//!
//! q.push("hello").unwrap();
//! assert_eq!(popper.join().unwrap(), "hello");
//! ```

#![deny(missing_docs)]

use core::fmt;

mod queue;

pub use queue::SlotQueue;

/// Error returned when constructing a queue with zero capacity.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct CapacityError;

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("queue capacity must be at least one slot")
    }
}

impl std::error::Error for CapacityError {}

/// Error type returned by the `push` family of methods.
///
/// Every variant carries the rejected item, so the caller can retry the
/// operation or dispose of the item. No variant leaves the queue modified.
#[derive(PartialEq, Eq, Copy, Clone)]
pub enum PushError<T> {
    /// Every slot was occupied. Only returned by
    /// [`try_push`](SlotQueue::try_push); the blocking variants wait for a
    /// free slot instead.
    Full(T),

    /// No slot was freed before the timeout elapsed. Only returned by
    /// [`push_timeout`](SlotQueue::push_timeout).
    TimedOut(T),

    /// The queue was closed, either before the call or while it was
    /// waiting for a free slot.
    Closed(T),
}

impl<T> PushError<T> {
    /// Recovers the item the failed push rejected.
    pub fn into_inner(self) -> T {
        match self {
            PushError::Full(item) => item,
            PushError::TimedOut(item) => item,
            PushError::Closed(item) => item,
        }
    }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Full(_) => f.write_str("Full(..)"),
            PushError::TimedOut(_) => f.write_str("TimedOut(..)"),
            PushError::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Full(_) => f.write_str("pushing onto a full queue"),
            PushError::TimedOut(_) => f.write_str("timed out waiting for a free slot"),
            PushError::Closed(_) => f.write_str("pushing onto a closed queue"),
        }
    }
}

impl<T> std::error::Error for PushError<T> {}

/// Error type returned by the `pop` family of methods.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum PopError {
    /// Every slot was empty. Only returned by
    /// [`try_pop`](SlotQueue::try_pop); the blocking variants wait for an
    /// item instead.
    Empty,

    /// No item arrived before the timeout elapsed. Only returned by
    /// [`pop_timeout`](SlotQueue::pop_timeout).
    TimedOut,

    /// The queue was closed and has no items left.
    Closed,
}

impl fmt::Display for PopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopError::Empty => f.write_str("popping from an empty queue"),
            PopError::TimedOut => f.write_str("timed out waiting for an item"),
            PopError::Closed => f.write_str("popping from a closed and drained queue"),
        }
    }
}

impl std::error::Error for PopError {}
