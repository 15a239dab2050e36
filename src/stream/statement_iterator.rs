//! Pull side of the bridge: a closeable, lazily evaluated iterator over
//! decoded statements with one-statement lookahead.

use crate::core::Statement;
use crate::queue::BoundedQueue;
use crate::stream::decode_worker::{DecodeOutcome, WorkerHandle};
use crate::stream::StreamError;
use std::sync::Arc;

/// Iterator over the statements of one decode stream.
///
/// The lookahead slot always holds the next statement to return, so
/// `has_next` answers without blocking. Exhaustion and explicit `close`
/// both tear the worker down; a consumed or closed iterator cannot be
/// rewound; start a fresh parse for a second pass.
pub struct StatementIterator {
    queue: Arc<BoundedQueue<Statement>>,
    worker: WorkerHandle,
    current: Option<Statement>,
    pending_error: Option<StreamError>,
    closed: bool,
}

impl StatementIterator {
    /// Build the iterator and eagerly prime the lookahead slot, blocking
    /// until the worker has produced its first statement or finished.
    pub(crate) fn new(queue: Arc<BoundedQueue<Statement>>, worker: WorkerHandle) -> Self {
        let mut iterator =
            Self { queue, worker, current: None, pending_error: None, closed: false };
        match iterator.advance() {
            Ok(next) => iterator.current = next,
            Err(e) => iterator.pending_error = Some(e),
        }
        iterator
    }

    /// True while a statement is ready to be returned. Never blocks.
    pub fn has_next(&self) -> bool {
        self.current.is_some()
    }

    /// Return the current statement and eagerly fetch the next one,
    /// blocking on the queue if the decoder has not caught up yet.
    ///
    /// If fetching the next statement observes a decode failure, the
    /// current statement is still returned and the failure is reported by
    /// the next call (or by `close`), so every statement decoded before
    /// the failure is delivered first.
    ///
    /// # Panics
    /// Panics when called after `has_next` returned false and no failure
    /// is pending.
    pub fn next_statement(&mut self) -> Result<Statement, StreamError> {
        let Some(statement) = self.current.take() else {
            if let Some(e) = self.pending_error.take() {
                return Err(e);
            }
            panic!("next_statement() called with no remaining statements");
        };
        match self.advance() {
            Ok(next) => self.current = next,
            Err(e) => self.pending_error = Some(e),
        }
        Ok(statement)
    }

    /// Number of decoded statements buffered ahead of the consumer.
    /// Diagnostic; bounded by the queue capacity.
    pub fn buffered(&self) -> usize {
        self.queue.len()
    }

    /// Handle for cancelling this stream from another thread.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle { queue: Arc::clone(&self.queue) }
    }

    /// Close the stream: cancel a still-running decode, wait for the
    /// worker to terminate, and report a decode failure if one occurred.
    /// A cancellation requested through `close` itself is not a failure.
    /// Idempotent, and a failure is reported exactly once.
    pub fn close(&mut self) -> Result<(), StreamError> {
        self.current = None;
        let result = self.shutdown();
        if let Some(e) = self.pending_error.take() {
            return Err(e);
        }
        result
    }

    /// Lookahead: the next statement, or `None` once the queue is drained
    /// and the worker has finished, at which point the worker is joined
    /// and its outcome inspected.
    fn advance(&mut self) -> Result<Option<Statement>, StreamError> {
        if self.closed {
            return Ok(None);
        }
        match self.queue.take() {
            Some(statement) => Ok(Some(statement)),
            None => self.shutdown().map(|()| None),
        }
    }

    fn shutdown(&mut self) -> Result<(), StreamError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        // Wakes a producer blocked on a full queue; its next put is
        // refused and the worker winds down as cancelled.
        self.queue.close();
        self.worker.join();
        match self.worker.take_outcome() {
            Some(DecodeOutcome::Failed(e)) => Err(StreamError::Decode(e)),
            _ => Ok(()),
        }
    }
}

impl Iterator for StatementIterator {
    type Item = Result<Statement, StreamError>;

    /// Yields every decoded statement as `Ok`, then a deferred decode
    /// failure (if any) as one `Err`, then `None`.
    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_some() {
            Some(self.next_statement())
        } else {
            self.pending_error.take().map(Err)
        }
    }
}

impl Drop for StatementIterator {
    /// The worker never outlives the iterator. A failure surfacing during
    /// drop is discarded; call `close` to observe it deterministically.
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

/// Cancels a stream from any thread: the counterpart of calling `close`
/// from a thread other than the consuming one. Cancellation is not an
/// error: the iterator winds down cleanly on its next operation.
#[derive(Clone)]
pub struct CancelHandle {
    queue: Arc<BoundedQueue<Statement>>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.queue.close();
    }
}
