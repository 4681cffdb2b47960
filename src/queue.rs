use core::fmt;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::{CapacityError, PopError, PushError};

/// A fixed-capacity, blocking FIFO queue.
///
/// The queue is a circular buffer of `capacity` slots guarded by a single
/// mutex. [`push`](Self::push) suspends the caller while every slot is
/// occupied and [`pop`](Self::pop) suspends while every slot is empty;
/// suspension releases the mutex, so the queue can never deadlock on its own
/// waiters. Items leave in exactly the order they entered, regardless of
/// which threads performed the operations.
///
/// Any number of producer and consumer threads may share one instance —
/// wrap it in an [`Arc`](std::sync::Arc) (or borrow it from a scope) and
/// hand clones to each thread. No guarantee is made about *which* of
/// several simultaneously blocked threads proceeds first when a slot or an
/// item becomes available; only item order is FIFO.
///
/// ```rust
/// use slotq::SlotQueue;
///
/// let q = SlotQueue::with_capacity(4).unwrap();
///
/// q.push(1).unwrap();
/// q.push(2).unwrap();
///
/// assert_eq!(q.pop(), Ok(1));
/// assert_eq!(q.pop(), Ok(2));
/// ```
pub struct SlotQueue<T> {
    /// Slot storage and ring indices, all behind one lock.
    ring: Mutex<Ring<T>>,

    /// Signalled once per pop and broadcast on close; pushes wait here.
    not_full: Condvar,

    /// Signalled once per push and broadcast on close; pops wait here.
    not_empty: Condvar,

    /// Immutable after construction, readable without the lock.
    capacity: usize,
}

/// Everything the mutex protects. Invariant: exactly `len` contiguous
/// slots starting at `head` (wrapping) are `Some`, all others are `None`.
struct Ring<T> {
    slots: Box<[Option<T>]>,

    /// Take index: the slot the next pop reads.
    head: usize,

    /// Put index: the slot the next push writes.
    tail: usize,

    /// Occupied slot count.
    len: usize,

    /// Set once by `close`; never cleared.
    closed: bool,
}

impl<T> Ring<T> {
    /// Writes `item` at `tail` and advances. Hands the item back when every
    /// slot is occupied.
    fn put(&mut self, item: T) -> Result<(), T> {
        if self.len == self.slots.len() {
            return Err(item);
        }
        debug_assert!(self.slots[self.tail].is_none());
        self.slots[self.tail] = Some(item);
        self.tail += 1;
        if self.tail == self.slots.len() {
            self.tail = 0;
        }
        self.len += 1;
        Ok(())
    }

    /// Clears the slot at `head` and advances. `None` when the queue is
    /// empty — an empty `head` slot and `len == 0` coincide by invariant.
    fn take(&mut self) -> Option<T> {
        let item = self.slots[self.head].take()?;
        self.head += 1;
        if self.head == self.slots.len() {
            self.head = 0;
        }
        self.len -= 1;
        Some(item)
    }
}

impl<T> SlotQueue<T> {
    /// Creates an empty queue with room for exactly `capacity` items.
    ///
    /// The capacity is fixed for the queue's whole lifetime. Zero is the
    /// one rejected capacity — a queue no push could ever succeed on.
    ///
    /// ```rust
    /// use slotq::{CapacityError, SlotQueue};
    ///
    /// assert!(SlotQueue::<u8>::with_capacity(1).is_ok());
    /// assert_eq!(SlotQueue::<u8>::with_capacity(0).unwrap_err(), CapacityError);
    /// ```
    pub fn with_capacity(capacity: usize) -> Result<Self, CapacityError> {
        if capacity == 0 {
            return Err(CapacityError);
        }
        Ok(SlotQueue {
            ring: Mutex::new(Ring {
                slots: (0..capacity).map(|_| None).collect(),
                head: 0,
                tail: 0,
                len: 0,
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
        })
    }

    /// Appends `item` to the tail of the queue, waiting as long as it takes
    /// for a slot to free up.
    ///
    /// The check-and-insert of each attempt runs as one critical section:
    /// no other operation can observe the queue between the capacity test
    /// and the slot write. Waiting releases the lock.
    ///
    /// Fails with [`PushError::Closed`], handing the item back, if the
    /// queue is closed before a slot becomes available. A full queue is not
    /// an error — that is what the wait is for.
    pub fn push(&self, mut item: T) -> Result<(), PushError<T>> {
        let mut ring = self.ring.lock();
        loop {
            if ring.closed {
                return Err(PushError::Closed(item));
            }
            match ring.put(item) {
                Ok(()) => {
                    drop(ring);
                    self.not_empty.notify_one();
                    return Ok(());
                }
                Err(rejected) => {
                    item = rejected;
                    self.not_full.wait(&mut ring);
                }
            }
        }
    }

    /// Removes and returns the item at the head of the queue, waiting as
    /// long as it takes for one to arrive.
    ///
    /// The freed slot is cleared before the lock is released, so no removed
    /// item lingers in the buffer. A closed queue still yields its
    /// remaining items in order; once it is closed *and* drained, fails
    /// with [`PopError::Closed`].
    pub fn pop(&self) -> Result<T, PopError> {
        let mut ring = self.ring.lock();
        loop {
            if let Some(item) = ring.take() {
                drop(ring);
                self.not_full.notify_one();
                return Ok(item);
            }
            if ring.closed {
                return Err(PopError::Closed);
            }
            self.not_empty.wait(&mut ring);
        }
    }

    /// Appends `item` without waiting.
    ///
    /// Fails with [`PushError::Full`] instead of blocking when every slot
    /// is occupied, and with [`PushError::Closed`] once the queue is
    /// closed.
    ///
    /// ```rust
    /// use slotq::{PushError, SlotQueue};
    ///
    /// let q = SlotQueue::with_capacity(1).unwrap();
    ///
    /// assert_eq!(q.try_push('a'), Ok(()));
    /// assert_eq!(q.try_push('b'), Err(PushError::Full('b')));
    /// ```
    pub fn try_push(&self, item: T) -> Result<(), PushError<T>> {
        let mut ring = self.ring.lock();
        if ring.closed {
            return Err(PushError::Closed(item));
        }
        match ring.put(item) {
            Ok(()) => {
                drop(ring);
                self.not_empty.notify_one();
                Ok(())
            }
            Err(rejected) => Err(PushError::Full(rejected)),
        }
    }

    /// Removes and returns the head item without waiting.
    ///
    /// Fails with [`PopError::Empty`] instead of blocking when every slot
    /// is empty, and with [`PopError::Closed`] once the queue is closed and
    /// drained.
    pub fn try_pop(&self) -> Result<T, PopError> {
        let mut ring = self.ring.lock();
        match ring.take() {
            Some(item) => {
                drop(ring);
                self.not_full.notify_one();
                Ok(item)
            }
            None if ring.closed => Err(PopError::Closed),
            None => Err(PopError::Empty),
        }
    }

    /// Appends `item`, waiting at most `timeout` for a slot to free up.
    ///
    /// The wait is deadline-based: wake-ups that lose the race for the
    /// freed slot go back to sleep for the remainder of the timeout, not
    /// for a fresh one. Fails with [`PushError::TimedOut`], handing the
    /// item back, when the deadline passes with every slot still occupied.
    pub fn push_timeout(&self, mut item: T, timeout: Duration) -> Result<(), PushError<T>> {
        let deadline = Instant::now() + timeout;
        let mut ring = self.ring.lock();
        loop {
            if ring.closed {
                return Err(PushError::Closed(item));
            }
            match ring.put(item) {
                Ok(()) => {
                    drop(ring);
                    self.not_empty.notify_one();
                    return Ok(());
                }
                Err(rejected) => item = rejected,
            }
            if self.not_full.wait_until(&mut ring, deadline).timed_out() {
                if ring.closed {
                    return Err(PushError::Closed(item));
                }
                // Final attempt: a slot may have freed up in the same
                // instant the deadline passed.
                return match ring.put(item) {
                    Ok(()) => {
                        drop(ring);
                        self.not_empty.notify_one();
                        Ok(())
                    }
                    Err(rejected) => Err(PushError::TimedOut(rejected)),
                };
            }
        }
    }

    /// Removes and returns the head item, waiting at most `timeout` for
    /// one to arrive.
    ///
    /// Fails with [`PopError::TimedOut`] when the deadline passes with the
    /// queue still empty.
    pub fn pop_timeout(&self, timeout: Duration) -> Result<T, PopError> {
        let deadline = Instant::now() + timeout;
        let mut ring = self.ring.lock();
        loop {
            if let Some(item) = ring.take() {
                drop(ring);
                self.not_full.notify_one();
                return Ok(item);
            }
            if ring.closed {
                return Err(PopError::Closed);
            }
            if self.not_empty.wait_until(&mut ring, deadline).timed_out() {
                if let Some(item) = ring.take() {
                    drop(ring);
                    self.not_full.notify_one();
                    return Ok(item);
                }
                return if ring.closed {
                    Err(PopError::Closed)
                } else {
                    Err(PopError::TimedOut)
                };
            }
        }
    }

    /// Closes the queue, waking every blocked pusher and popper.
    ///
    /// Woken pushers fail with [`PushError::Closed`] and get their item
    /// back; woken poppers fail with [`PopError::Closed`]. Items already
    /// queued are untouched and remain poppable. Closing is idempotent;
    /// the return value reports whether *this* call performed the close.
    ///
    /// ```rust
    /// use slotq::{PopError, SlotQueue};
    ///
    /// let q = SlotQueue::with_capacity(4).unwrap();
    /// q.push("left over").unwrap();
    ///
    /// assert!(q.close());
    /// assert!(!q.close());
    ///
    /// // The queue drains before reporting closure.
    /// assert_eq!(q.pop(), Ok("left over"));
    /// assert_eq!(q.pop(), Err(PopError::Closed));
    /// ```
    pub fn close(&self) -> bool {
        let mut ring = self.ring.lock();
        let was_open = !ring.closed;
        ring.closed = true;
        drop(ring);
        if was_open {
            self.not_full.notify_all();
            self.not_empty.notify_all();
        }
        was_open
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.ring.lock().closed
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        self.ring.lock().len
    }

    /// Whether no slot holds an item.
    pub fn is_empty(&self) -> bool {
        self.ring.lock().len == 0
    }

    /// Whether every slot holds an item.
    pub fn is_full(&self) -> bool {
        self.ring.lock().len == self.capacity
    }

    /// Number of slots fixed at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> fmt::Debug for SlotQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ring = self.ring.lock();
        f.debug_struct("SlotQueue")
            .field("capacity", &self.capacity)
            .field("len", &ring.len)
            .field("closed", &ring.closed)
            .finish()
    }
}
