//! RDF decoders and the seams they plug into.

pub mod base_iri;
pub mod decoder;
pub mod ntriples;

pub use base_iri::{BaseIri, InvalidBaseIri};
pub use decoder::{DecodeError, Decoder, RdfFormat, StatementCollector, StatementHandler};
pub use ntriples::{NQuadsDecoder, NTriplesDecoder};
