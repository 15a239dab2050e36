//! The decode worker: drives a decoder on a pool thread and captures its
//! terminal outcome.

use crate::core::Statement;
use crate::parsing::{DecodeError, Decoder, StatementHandler};
use crate::pool::{PoolError, WorkerPool};
use crate::queue::BoundedQueue;
use std::io::BufRead;
use std::sync::{Arc, Condvar, Mutex};

/// Terminal outcome of a decode worker, recorded exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The whole input decoded successfully.
    Completed,
    /// The decoder or the input stream failed. Never retried.
    Failed(DecodeError),
    /// The consumer closed the stream before the decode finished.
    Cancelled,
}

/// Pushes each decoded statement into the bounded queue, blocking while it
/// is full. A refused put means the consumer closed the queue; the decode
/// must treat that as an interruption, not a data error.
struct QueueSink {
    queue: Arc<BoundedQueue<Statement>>,
}

impl StatementHandler for QueueSink {
    fn handle_statement(&mut self, statement: Statement) -> Result<(), DecodeError> {
        self.queue.put(statement).map_err(|_| DecodeError::Interrupted)
    }
}

struct HandleState {
    done: Mutex<bool>,
    done_signal: Condvar,
    outcome: Mutex<Option<DecodeOutcome>>,
}

/// Handle to a running decode worker, held by the statement iterator.
pub struct WorkerHandle {
    state: Arc<HandleState>,
}

impl WorkerHandle {
    pub fn is_finished(&self) -> bool {
        *self.state.done.lock().unwrap()
    }

    /// Block until the worker has recorded its outcome and left the job.
    pub fn join(&self) {
        let mut done = self.state.done.lock().unwrap();
        while !*done {
            done = self.state.done_signal.wait(done).unwrap();
        }
    }

    /// Take the recorded outcome. `None` before the worker finished, or
    /// after the outcome was already taken.
    pub fn take_outcome(&self) -> Option<DecodeOutcome> {
        self.state.outcome.lock().unwrap().take()
    }
}

/// Start a decode worker on the pool. The input stream is owned by the
/// worker from here on and is dropped (closed) when the decode ends.
///
/// The worker classifies its own interruption: a decode aborted because
/// the consumer closed the queue is recorded as `Cancelled`, so a
/// deliberate cancellation is never misreported as a decode failure.
pub fn spawn_decode_worker(
    pool: &WorkerPool,
    decoder: Box<dyn Decoder + Send>,
    input: Box<dyn BufRead + Send>,
    queue: Arc<BoundedQueue<Statement>>,
) -> Result<WorkerHandle, PoolError> {
    let state = Arc::new(HandleState {
        done: Mutex::new(false),
        done_signal: Condvar::new(),
        outcome: Mutex::new(None),
    });
    let worker_state = Arc::clone(&state);

    pool.submit(move || {
        let mut sink = QueueSink { queue: Arc::clone(&queue) };
        let result = decoder.decode(input, &mut sink);
        let outcome = match result {
            Ok(()) => DecodeOutcome::Completed,
            Err(DecodeError::Interrupted) => DecodeOutcome::Cancelled,
            Err(e) => DecodeOutcome::Failed(e),
        };
        // Outcome before finish: a consumer woken by finish() joins on the
        // done flag, which is set last, and must then find the outcome.
        *worker_state.outcome.lock().unwrap() = Some(outcome);
        queue.finish();
        let mut done = worker_state.done.lock().unwrap();
        *done = true;
        worker_state.done_signal.notify_all();
    })?;

    Ok(WorkerHandle { state })
}
