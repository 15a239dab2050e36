//! An owned, injected worker pool.
//!
//! The pool is created by the application, passed to whoever starts decode
//! streams, and torn down with `shutdown`; there is no ambient process-wide
//! pool. It grows on demand so stream creation never blocks on pool
//! capacity, and worker threads that stay idle past `idle_timeout` exit.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Configuration for the worker pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// How long an idle worker waits for new work before its thread exits.
    pub idle_timeout: Duration,
    /// Worker thread name prefix, for diagnostics.
    pub thread_name: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { idle_timeout: Duration::from_secs(60), thread_name: "styx-decode".to_string() }
    }
}

/// Errors raised when submitting work to the pool.
#[derive(Debug)]
pub enum PoolError {
    /// The pool has been shut down and accepts no further work.
    Shutdown,
    /// The operating system refused to spawn a worker thread.
    Spawn(String),
}

impl std::fmt::Display for PoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolError::Shutdown => write!(f, "Pool error: pool is shut down"),
            PoolError::Spawn(msg) => write!(f, "Pool error: failed to spawn worker: {}", msg),
        }
    }
}

impl std::error::Error for PoolError {}

struct PoolState {
    /// Workers currently waiting for a job.
    idle: usize,
    /// Jobs submitted but not yet picked up by a worker.
    pending: usize,
    sender: Option<Sender<Job>>,
    handles: Vec<JoinHandle<()>>,
    next_worker_id: usize,
}

struct PoolShared {
    state: Mutex<PoolState>,
    receiver: Mutex<Receiver<Job>>,
    live_workers: AtomicUsize,
    config: PoolConfig,
}

/// Grow-on-demand thread pool with idle reclaim and explicit shutdown.
pub struct WorkerPool {
    shared: Arc<PoolShared>,
}

impl WorkerPool {
    pub fn new(config: PoolConfig) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            shared: Arc::new(PoolShared {
                state: Mutex::new(PoolState {
                    idle: 0,
                    pending: 0,
                    sender: Some(sender),
                    handles: Vec::new(),
                    next_worker_id: 0,
                }),
                receiver: Mutex::new(receiver),
                live_workers: AtomicUsize::new(0),
                config,
            }),
        }
    }

    /// Submit a job. An idle worker picks it up if one is available;
    /// otherwise a new thread is spawned. Never blocks on pool capacity.
    pub fn submit<F>(&self, job: F) -> Result<(), PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.shared.state.lock().unwrap();
        let Some(sender) = state.sender.clone() else {
            return Err(PoolError::Shutdown);
        };
        state.handles.retain(|handle| !handle.is_finished());
        state.pending += 1;
        if state.idle < state.pending {
            let id = state.next_worker_id;
            state.next_worker_id += 1;
            match spawn_worker(Arc::clone(&self.shared), id) {
                Ok(handle) => state.handles.push(handle),
                Err(e) => {
                    state.pending -= 1;
                    return Err(PoolError::Spawn(e.to_string()));
                }
            }
        }
        // The channel is unbounded, so sending under the state lock cannot
        // block; it keeps the pending count consistent with channel content.
        sender.send(Box::new(job)).map_err(|_| PoolError::Shutdown)?;
        Ok(())
    }

    /// Number of worker threads currently alive, idle or busy.
    pub fn worker_count(&self) -> usize {
        self.shared.live_workers.load(Ordering::SeqCst)
    }

    /// Stop accepting work and wait for every worker thread to exit.
    /// Already-submitted jobs run to completion first.
    pub fn shutdown(&self) {
        let handles = {
            let mut state = self.shared.state.lock().unwrap();
            state.sender = None;
            std::mem::take(&mut state.handles)
        };
        for handle in handles {
            let _ = handle.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_worker(shared: Arc<PoolShared>, id: usize) -> std::io::Result<JoinHandle<()>> {
    let name = format!("{}-{}", shared.config.thread_name, id);
    shared.live_workers.fetch_add(1, Ordering::SeqCst);
    let loop_shared = Arc::clone(&shared);
    match thread::Builder::new().name(name).spawn(move || worker_loop(&loop_shared)) {
        Ok(handle) => Ok(handle),
        Err(e) => {
            shared.live_workers.fetch_sub(1, Ordering::SeqCst);
            Err(e)
        }
    }
}

fn worker_loop(shared: &PoolShared) {
    loop {
        {
            let mut state = shared.state.lock().unwrap();
            state.idle += 1;
        }
        let received = {
            let receiver = shared.receiver.lock().unwrap();
            receiver.recv_timeout(shared.config.idle_timeout)
        };
        match received {
            Ok(job) => {
                {
                    let mut state = shared.state.lock().unwrap();
                    state.idle -= 1;
                    state.pending -= 1;
                }
                job();
            }
            Err(RecvTimeoutError::Timeout) => {
                let mut state = shared.state.lock().unwrap();
                state.idle -= 1;
                // A job may have landed in the instant the timeout fired.
                // If the remaining idle workers cannot cover the pending
                // jobs, stay alive and go wait again.
                if state.pending > state.idle {
                    continue;
                }
                break;
            }
            Err(RecvTimeoutError::Disconnected) => {
                let mut state = shared.state.lock().unwrap();
                state.idle -= 1;
                break;
            }
        }
    }
    shared.live_workers.fetch_sub(1, Ordering::SeqCst);
}
