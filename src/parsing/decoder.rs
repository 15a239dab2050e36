//! The decoder seam: push-style decoders deliver statements one at a time
//! to a handler, which the bridge backs with the bounded queue.

use crate::core::Statement;
use crate::parsing::base_iri::BaseIri;
use crate::parsing::ntriples::{NQuadsDecoder, NTriplesDecoder};
use std::fmt;
use std::io::BufRead;

/// Receives decoded statements one at a time, in input order. Returning an
/// error aborts the decode; the decoder must not swallow it.
pub trait StatementHandler {
    fn handle_statement(&mut self, statement: Statement) -> Result<(), DecodeError>;
}

/// A push-style, incrementally driven RDF decoder.
pub trait Decoder {
    /// Drive the decode to completion, delivering every statement to the
    /// handler. The input stream is owned by the decode and dropped
    /// (closed) when it returns, on success and on failure alike.
    fn decode(
        &self,
        input: Box<dyn BufRead + Send>,
        handler: &mut dyn StatementHandler,
    ) -> Result<(), DecodeError>;
}

/// Collects every statement of a decode into memory. Suited to small
/// inputs and to tests; large inputs should go through the bounded bridge
/// instead.
#[derive(Debug, Default)]
pub struct StatementCollector {
    statements: Vec<Statement>,
}

impl StatementCollector {
    pub fn new() -> Self {
        Self { statements: Vec::new() }
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn into_statements(self) -> Vec<Statement> {
        self.statements
    }
}

impl StatementHandler for StatementCollector {
    fn handle_statement(&mut self, statement: Statement) -> Result<(), DecodeError> {
        self.statements.push(statement);
        Ok(())
    }
}

/// Errors raised while decoding. Syntax and I/O failures are terminal for
/// the stream and are never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The input violated the serialization grammar.
    Syntax { line: u64, message: String },
    /// Reading the underlying stream failed.
    Io(String),
    /// The consumer side went away mid-decode. Internal plumbing for
    /// cancellation; classified as Cancelled by the worker, never surfaced
    /// to the consumer as a failure.
    Interrupted,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Syntax { line, message } => {
                write!(f, "Syntax error at line {}: {}", line, message)
            }
            DecodeError::Io(msg) => write!(f, "I/O error: {}", msg),
            DecodeError::Interrupted => write!(f, "Decode interrupted"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// The concrete serializations a decoder exists for. Selection logic by
/// media type mirrors what surrounding application code passes around;
/// anything else is rejected at stream setup, before a worker is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    NTriples,
    NQuads,
}

impl RdfFormat {
    /// Look up a format by media type. Parameters (`; charset=...`) and
    /// case are ignored. `text/plain` is the legacy N-Triples type.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type.split(';').next().unwrap_or("").trim().to_lowercase();
        match essence.as_str() {
            "application/n-triples" | "text/plain" => Some(RdfFormat::NTriples),
            "application/n-quads" | "text/x-nquads" => Some(RdfFormat::NQuads),
            _ => None,
        }
    }

    /// Look up a format by file extension (with or without the dot).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_lowercase().as_str() {
            "nt" | "ntriples" => Some(RdfFormat::NTriples),
            "nq" | "nquads" => Some(RdfFormat::NQuads),
            _ => None,
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            RdfFormat::NTriples => "application/n-triples",
            RdfFormat::NQuads => "application/n-quads",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RdfFormat::NTriples => "N-Triples",
            RdfFormat::NQuads => "N-Quads",
        }
    }

    /// Instantiate the decoder for this format.
    pub fn new_decoder(&self, base: Option<BaseIri>) -> Box<dyn Decoder + Send> {
        match self {
            RdfFormat::NTriples => Box::new(NTriplesDecoder::new(base)),
            RdfFormat::NQuads => Box::new(NQuadsDecoder::new(base)),
        }
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_lookup() {
        assert_eq!(RdfFormat::from_media_type("application/n-triples"), Some(RdfFormat::NTriples));
        assert_eq!(RdfFormat::from_media_type("application/n-quads"), Some(RdfFormat::NQuads));
        assert_eq!(RdfFormat::from_media_type("text/plain"), Some(RdfFormat::NTriples));
    }

    #[test]
    fn test_media_type_parameters_and_case_ignored() {
        assert_eq!(
            RdfFormat::from_media_type("Application/N-Triples; charset=utf-8"),
            Some(RdfFormat::NTriples)
        );
    }

    #[test]
    fn test_unknown_media_type() {
        assert_eq!(RdfFormat::from_media_type("application/rdf+xml"), None);
        assert_eq!(RdfFormat::from_media_type(""), None);
    }

    #[test]
    fn test_extension_lookup() {
        assert_eq!(RdfFormat::from_extension("nt"), Some(RdfFormat::NTriples));
        assert_eq!(RdfFormat::from_extension(".nq"), Some(RdfFormat::NQuads));
        assert_eq!(RdfFormat::from_extension("ttl"), None);
    }
}
