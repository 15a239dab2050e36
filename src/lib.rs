//! # Styx
//!
//! Styx is a bounded asynchronous RDF decode bridge: serialized RDF data is
//! decoded push-style on a worker thread while the consumer pulls statements
//! through an ordinary iterator, with a fixed-capacity queue between the two.
//!
//! The name "Styx" is inspired by the river of Greek myth that separates two
//! worlds and is crossed by ferry, one passenger at a time, in one direction
//! only. This reflects how decoded statements are ferried from the decoding
//! side to the consuming side: strictly in order, never more than the queue
//! capacity in transit, and with no way back: a consumed stream cannot be
//! rewound.
//!
//! ## Features
//!
//! - Bounded buffering: the consumer's speed throttles the decoder, so peak
//!   memory use never exceeds the configured queue capacity
//! - One-ahead lookahead, so "is there more" never blocks
//! - Early cancellation with guaranteed worker teardown, also from another
//!   thread
//! - Decode failures replayed synchronously at the next observation point,
//!   after every statement decoded before the failure has been delivered
//!
//! ## Example
//!
//! ```rust
//! use std::io::Cursor;
//! use std::sync::Arc;
//! use styx::{BoundedAsyncParser, PoolConfig, WorkerPool};
//!
//! let pool = Arc::new(WorkerPool::new(PoolConfig::default()));
//! let parser = BoundedAsyncParser::new(Arc::clone(&pool));
//!
//! let data = "<http://example.org/s> <http://example.org/p> \"o\" .\n";
//! let mut statements = parser.parse(Cursor::new(data), "application/n-triples", None).unwrap();
//! while statements.has_next() {
//!     println!("{}", statements.next_statement().unwrap());
//! }
//! statements.close().unwrap();
//! pool.shutdown();
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]

/// Core data structures and types
pub mod core;

/// RDF decoders and the seams they plug into
pub mod parsing;

/// Worker pool supplying execution units to decode workers
pub mod pool;

/// Bounded buffering between decoder and consumer
pub mod queue;

/// The decode-to-iterator bridge
pub mod stream;

// Re-export commonly used types
pub use crate::core::{Statement, Term};
pub use crate::parsing::{
    BaseIri, DecodeError, Decoder, NQuadsDecoder, NTriplesDecoder, RdfFormat, StatementCollector,
    StatementHandler,
};
pub use crate::pool::{PoolConfig, PoolError, WorkerPool};
pub use crate::queue::{BoundedQueue, QueueClosedError};
pub use crate::stream::{
    BoundedAsyncParser, CancelHandle, DecodeOutcome, StatementIterator, StreamError,
    DEFAULT_QUEUE_CAPACITY,
};
