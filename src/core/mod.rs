//! Core data structures and types for the Styx decode bridge.

use serde::Serialize;
use std::fmt;

/// One decoded RDF statement: subject, predicate, object and an optional
/// graph context. Immutable once produced by a decoder; ownership moves
/// from the decoder into the queue and from the queue to the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    pub subject: Term,
    pub predicate: String,
    pub object: Term,
    pub graph: Option<String>,
}

/// One RDF term. Literals keep their datatype IRI or language tag, so a
/// statement that went through the bridge compares structurally equal to
/// the same statement from a whole-input decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Term {
    Iri(String),
    BlankNode(String),
    Literal { value: String, datatype: Option<String>, language: Option<String> },
}

impl Statement {
    pub fn new(subject: Term, predicate: String, object: Term, graph: Option<String>) -> Self {
        Self { subject, predicate, object, graph }
    }
}

impl fmt::Display for Statement {
    /// Renders the statement as one N-Quads line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {}", self.subject, self.predicate, self.object)?;
        if let Some(graph) = &self.graph {
            if graph.starts_with("_:") {
                write!(f, " {}", graph)?;
            } else {
                write!(f, " <{}>", graph)?;
            }
        }
        write!(f, " .")
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::BlankNode(label) => write!(f, "_:{}", label),
            Term::Literal { value, datatype, language } => {
                f.write_str("\"")?;
                write_escaped(f, value)?;
                f.write_str("\"")?;
                if let Some(lang) = language {
                    write!(f, "@{}", lang)?;
                } else if let Some(dt) = datatype {
                    write!(f, "^^<{}>", dt)?;
                }
                Ok(())
            }
        }
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    for ch in value.chars() {
        match ch {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            other => fmt::Write::write_char(f, other)?,
        }
    }
    Ok(())
}
