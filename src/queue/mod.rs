//! Bounded buffering between the decode worker and the consuming iterator.

pub mod bounded_queue;

pub use bounded_queue::{BoundedQueue, QueueClosedError};
