//! Base IRI handling for resolving relative references.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

static SCHEME_RE: OnceLock<Regex> = OnceLock::new();

fn scheme_re() -> &'static Regex {
    SCHEME_RE.get_or_init(|| Regex::new("^[A-Za-z][A-Za-z0-9+.-]*:").unwrap())
}

/// True when the reference carries its own scheme, i.e. is absolute.
pub(crate) fn has_scheme(reference: &str) -> bool {
    scheme_re().is_match(reference)
}

/// The base IRI supplied at parse time is rejected here when it is not
/// absolute, before any worker is started.
#[derive(Debug)]
pub struct InvalidBaseIri(pub String);

impl fmt::Display for InvalidBaseIri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Base IRI is not absolute: {}", self.0)
    }
}

impl std::error::Error for InvalidBaseIri {}

/// An absolute IRI against which relative references are resolved,
/// following the RFC 3986 reference-resolution rules.
#[derive(Debug, Clone)]
pub struct BaseIri {
    base: String,
}

impl BaseIri {
    pub fn new(iri: &str) -> Result<Self, InvalidBaseIri> {
        if has_scheme(iri) {
            Ok(Self { base: iri.to_string() })
        } else {
            Err(InvalidBaseIri(iri.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// Resolve a reference against this base. Absolute references pass
    /// through unchanged.
    pub fn resolve(&self, reference: &str) -> String {
        if reference.is_empty() {
            return strip_fragment(&self.base).to_string();
        }
        if has_scheme(reference) {
            return reference.to_string();
        }

        // The constructor guarantees a scheme, so the split cannot fail.
        let colon = self.base.find(':').unwrap();
        let scheme = &self.base[..colon];
        let rest = &self.base[colon + 1..];

        if reference.starts_with("//") {
            return format!("{}:{}", scheme, reference);
        }
        if reference.starts_with('#') {
            return format!("{}{}", strip_fragment(&self.base), reference);
        }

        let (authority, path_query) = match rest.strip_prefix("//") {
            Some(after) => {
                let end = after.find(['/', '?', '#']).unwrap_or(after.len());
                (Some(&after[..end]), &after[end..])
            }
            None => (None, rest),
        };
        let prefix = match authority {
            Some(authority) => format!("{}://{}", scheme, authority),
            None => format!("{}:", scheme),
        };

        let path_query = strip_fragment(path_query);
        let base_path = match path_query.find('?') {
            Some(i) => &path_query[..i],
            None => path_query,
        };

        if reference.starts_with('?') {
            return format!("{}{}{}", prefix, base_path, reference);
        }

        let merged = if reference.starts_with('/') {
            reference.to_string()
        } else if base_path.is_empty() {
            format!("/{}", reference)
        } else {
            match base_path.rfind('/') {
                Some(i) => format!("{}{}", &base_path[..=i], reference),
                None => reference.to_string(),
            }
        };

        // Dot segments live in the path only, not in the query or fragment.
        let tail_start = merged.find(['?', '#']).unwrap_or(merged.len());
        let (path, tail) = merged.split_at(tail_start);
        format!("{}{}{}", prefix, remove_dot_segments(path), tail)
    }
}

fn strip_fragment(iri: &str) -> &str {
    match iri.find('#') {
        Some(i) => &iri[..i],
        None => iri,
    }
}

fn remove_dot_segments(path: &str) -> String {
    let mut output: Vec<&str> = Vec::new();
    let mut trailing_slash = false;
    for segment in path.split('/') {
        match segment {
            "." => trailing_slash = true,
            ".." => {
                if output.last().map_or(false, |s| !s.is_empty()) {
                    output.pop();
                }
                trailing_slash = true;
            }
            other => {
                output.push(other);
                trailing_slash = other.is_empty();
            }
        }
    }
    let mut joined = output.join("/");
    if trailing_slash && !joined.ends_with('/') {
        joined.push('/');
    }
    joined
}
