//! The decode-to-iterator bridge.
//!
//! `BoundedAsyncParser` ties the pieces together: it selects a decoder for
//! the requested format, starts a decode worker on the injected pool, and
//! hands the caller a `StatementIterator` backed by the bounded queue.

pub mod decode_worker;
pub mod statement_iterator;

pub use decode_worker::{spawn_decode_worker, DecodeOutcome, WorkerHandle};
pub use statement_iterator::{CancelHandle, StatementIterator};

use crate::core::Statement;
use crate::parsing::{BaseIri, DecodeError, RdfFormat};
use crate::pool::WorkerPool;
use crate::queue::BoundedQueue;
use std::fmt;
use std::io::BufRead;
use std::sync::Arc;

/// How many statements the decoder may run ahead of the consumer unless a
/// capacity override is given.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Errors surfaced to the consumer of a statement stream.
#[derive(Debug, PartialEq, Eq)]
pub enum StreamError {
    /// No decoder exists for the requested media type. Raised at stream
    /// setup, before any worker is started.
    UnsupportedFormat(String),
    /// The supplied base IRI is not absolute. Raised at stream setup.
    InvalidBaseIri(String),
    /// The decode failed; the underlying error is preserved.
    Decode(DecodeError),
    /// A worker could not be obtained from the pool.
    Worker(String),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::UnsupportedFormat(media_type) => {
                write!(f, "Unsupported format: {}", media_type)
            }
            StreamError::InvalidBaseIri(iri) => write!(f, "Invalid base IRI: {}", iri),
            StreamError::Decode(e) => write!(f, "Decode error: {}", e),
            StreamError::Worker(msg) => write!(f, "Worker error: {}", msg),
        }
    }
}

impl std::error::Error for StreamError {}

impl From<DecodeError> for StreamError {
    fn from(e: DecodeError) -> Self {
        StreamError::Decode(e)
    }
}

/// Parses RDF data streams asynchronously, buffering at most the queue
/// capacity of decoded statements. The iterator client's speed controls
/// the decoder's speed.
pub struct BoundedAsyncParser {
    pool: Arc<WorkerPool>,
    capacity: usize,
}

impl BoundedAsyncParser {
    /// A parser using the default queue capacity of 100 statements.
    pub fn new(pool: Arc<WorkerPool>) -> Self {
        Self::with_capacity(pool, DEFAULT_QUEUE_CAPACITY)
    }

    /// A parser whose streams buffer at most `capacity` statements.
    pub fn with_capacity(pool: Arc<WorkerPool>, capacity: usize) -> Self {
        Self { pool, capacity }
    }

    /// Parse the given RDF data stream, selecting the decoder by media
    /// type. Fails fast with `UnsupportedFormat` when no decoder matches.
    ///
    /// The input stream is owned by the decode worker from here on and is
    /// closed (dropped) when decoding ends; see `parse_format`.
    pub fn parse(
        &self,
        input: impl BufRead + Send + 'static,
        media_type: &str,
        base_iri: Option<&str>,
    ) -> Result<StatementIterator, StreamError> {
        let format = RdfFormat::from_media_type(media_type)
            .ok_or_else(|| StreamError::UnsupportedFormat(media_type.to_string()))?;
        self.parse_format(input, format, base_iri)
    }

    /// Like `parse` with an explicit per-stream capacity override.
    pub fn parse_with_capacity(
        &self,
        input: impl BufRead + Send + 'static,
        media_type: &str,
        base_iri: Option<&str>,
        capacity: usize,
    ) -> Result<StatementIterator, StreamError> {
        let format = RdfFormat::from_media_type(media_type)
            .ok_or_else(|| StreamError::UnsupportedFormat(media_type.to_string()))?;
        self.parse_bounded(input, format, base_iri, capacity)
    }

    /// Parse the given RDF data stream with an already-selected format.
    pub fn parse_format(
        &self,
        input: impl BufRead + Send + 'static,
        format: RdfFormat,
        base_iri: Option<&str>,
    ) -> Result<StatementIterator, StreamError> {
        self.parse_bounded(input, format, base_iri, self.capacity)
    }

    fn parse_bounded(
        &self,
        input: impl BufRead + Send + 'static,
        format: RdfFormat,
        base_iri: Option<&str>,
        capacity: usize,
    ) -> Result<StatementIterator, StreamError> {
        let base = match base_iri {
            Some(iri) => {
                Some(BaseIri::new(iri).map_err(|_| StreamError::InvalidBaseIri(iri.to_string()))?)
            }
            None => None,
        };
        let decoder = format.new_decoder(base);
        let queue = Arc::new(BoundedQueue::<Statement>::new(capacity));
        let worker = spawn_decode_worker(&self.pool, decoder, Box::new(input), Arc::clone(&queue))
            .map_err(|e| StreamError::Worker(e.to_string()))?;
        Ok(StatementIterator::new(queue, worker))
    }
}
