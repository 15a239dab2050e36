//! Worker pool supplying execution units to decode workers.

pub mod worker_pool;

pub use worker_pool::{PoolConfig, PoolError, WorkerPool};
