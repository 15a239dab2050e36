//! Fixed-capacity FIFO queue with blocking put and take.
//!
//! This is the backpressure mechanism of the bridge: the producer blocks in
//! `put` while the queue is full, so a slow consumer throttles a fast
//! decoder and at most `capacity` statements are buffered at any instant.
//!
//! The queue also carries the stream's lifecycle flags. `finish` marks the
//! producer side as done, letting `take` drain the remaining items and then
//! report end-of-stream instead of blocking forever. `close` marks the
//! consumer side as gone, waking and refusing a blocked producer. Folding
//! the flags into `take`/`put` removes the check-then-block race a separate
//! "is the producer done" probe would have.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Condvar, Mutex};

/// Returned by `put` once the consumer has closed the queue. The producer
/// must stop decoding; this is a cancellation signal, not a data error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueClosedError;

impl fmt::Display for QueueClosedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Queue closed by the consumer")
    }
}

impl std::error::Error for QueueClosedError {}

struct QueueState<T> {
    items: VecDeque<T>,
    /// Producer finished; no further items will arrive.
    finished: bool,
    /// Consumer closed the stream; refuse further items, stop handing out
    /// buffered ones.
    closed: bool,
}

/// Fixed-capacity FIFO with blocking enqueue/dequeue.
pub struct BoundedQueue<T> {
    capacity: usize,
    state: Mutex<QueueState<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl<T> BoundedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be at least 1");
        Self {
            capacity,
            state: Mutex::new(QueueState { items: VecDeque::new(), finished: false, closed: false }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        }
    }

    /// Enqueue one item, blocking while the queue is at capacity. Returns
    /// an error instead once the consumer has closed the queue, including
    /// while blocked.
    pub fn put(&self, item: T) -> Result<(), QueueClosedError> {
        let mut state = self.state.lock().unwrap();
        loop {
            if state.closed {
                return Err(QueueClosedError);
            }
            if state.items.len() < self.capacity {
                state.items.push_back(item);
                self.not_empty.notify_one();
                return Ok(());
            }
            state = self.not_full.wait(state).unwrap();
        }
    }

    /// Dequeue the oldest item, blocking while the queue is empty and the
    /// producer is still running. Returns `None` once the queue is drained
    /// and the producer has finished, or immediately after `close`.
    pub fn take(&self) -> Option<T> {
        let mut state = self.state.lock().unwrap();
        loop {
            if state.closed {
                return None;
            }
            if let Some(item) = state.items.pop_front() {
                self.not_full.notify_one();
                return Some(item);
            }
            if state.finished {
                return None;
            }
            state = self.not_empty.wait(state).unwrap();
        }
    }

    /// Producer side: no further items will be enqueued. The consumer can
    /// still drain what is buffered.
    pub fn finish(&self) {
        let mut state = self.state.lock().unwrap();
        state.finished = true;
        self.not_empty.notify_all();
    }

    /// Consumer side: the stream is being abandoned. Buffered items are
    /// dropped and a blocked producer is woken to receive `QueueClosedError`.
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        state.items.clear();
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    /// Number of items currently buffered. Diagnostic; never exceeds the
    /// capacity.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
