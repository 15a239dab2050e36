//! Cancellation and shutdown behavior of the decode bridge:
//! - early close terminates the worker without reporting an error
//! - close is idempotent
//! - cancellation works from another thread
//! - dropping the iterator never leaks a worker

use std::io::Cursor;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use styx::{BoundedAsyncParser, PoolConfig, WorkerPool};

fn test_pool() -> Arc<WorkerPool> {
    Arc::new(WorkerPool::new(PoolConfig::default()))
}

fn ntriples_doc(n: usize) -> String {
    (0..n)
        .map(|i| {
            format!("<http://example.org/s/{}> <http://example.org/p> \"value {}\" .\n", i, i)
        })
        .collect()
}

#[test]
fn test_early_close_reports_no_error() {
    let pool = test_pool();
    let parser = BoundedAsyncParser::with_capacity(Arc::clone(&pool), 2);
    let mut statements =
        parser.parse(Cursor::new(ntriples_doc(10_000)), "application/n-triples", None).unwrap();

    for _ in 0..3 {
        assert!(statements.has_next());
        statements.next_statement().unwrap();
    }
    // The worker is mid-decode, blocked on the full queue. Closing must
    // wake it, wait for it to terminate, and report nothing.
    assert_eq!(statements.close(), Ok(()));
    pool.shutdown();
    assert_eq!(pool.worker_count(), 0);
}

#[test]
fn test_close_before_any_read() {
    let pool = test_pool();
    let parser = BoundedAsyncParser::with_capacity(Arc::clone(&pool), 2);
    let mut statements =
        parser.parse(Cursor::new(ntriples_doc(1000)), "application/n-triples", None).unwrap();
    assert_eq!(statements.close(), Ok(()));
    pool.shutdown();
}

#[test]
fn test_idempotent_close() {
    let pool = test_pool();
    let parser = BoundedAsyncParser::new(Arc::clone(&pool));
    let mut statements =
        parser.parse(Cursor::new(ntriples_doc(3)), "application/n-triples", None).unwrap();

    while statements.has_next() {
        statements.next_statement().unwrap();
    }
    assert_eq!(statements.close(), Ok(()));
    assert_eq!(statements.close(), Ok(()));
    pool.shutdown();
}

#[test]
fn test_cancel_from_another_thread() {
    let pool = test_pool();
    let parser = BoundedAsyncParser::with_capacity(Arc::clone(&pool), 4);
    let statements =
        parser.parse(Cursor::new(ntriples_doc(100_000)), "application/n-triples", None).unwrap();

    let cancel = statements.cancel_handle();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        cancel.cancel();
    });

    let mut count = 0usize;
    for statement in statements {
        statement.unwrap();
        count += 1;
        thread::sleep(Duration::from_millis(1));
    }
    canceller.join().unwrap();

    // The stream was cut short, and cancellation surfaced no error.
    assert!(count < 100_000);
    pool.shutdown();
}

#[test]
fn test_drop_releases_worker() {
    let pool = test_pool();
    let parser = BoundedAsyncParser::with_capacity(Arc::clone(&pool), 2);
    let mut statements =
        parser.parse(Cursor::new(ntriples_doc(100_000)), "application/n-triples", None).unwrap();

    statements.next_statement().unwrap();
    drop(statements);

    // Dropping closed the stream; the blocked worker must have been woken,
    // or this join would hang.
    pool.shutdown();
    assert_eq!(pool.worker_count(), 0);
}
