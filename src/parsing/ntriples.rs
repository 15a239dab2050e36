//! Hand-rolled decoders for the N-Triples and N-Quads serializations.
//!
//! One statement per line; blank lines and `#` comments are skipped.
//! Literals keep their datatype IRI or language tag. Relative IRI
//! references are resolved against the configured base; without a base
//! they pass through unchanged.

use crate::core::{Statement, Term};
use crate::parsing::base_iri::{has_scheme, BaseIri};
use crate::parsing::decoder::{DecodeError, Decoder, StatementHandler};
use regex::Regex;
use std::io::BufRead;
use std::str::CharIndices;
use std::sync::OnceLock;

static LANG_TAG_RE: OnceLock<Regex> = OnceLock::new();

fn lang_tag_re() -> &'static Regex {
    LANG_TAG_RE.get_or_init(|| Regex::new("^[A-Za-z]{1,8}(-[A-Za-z0-9]{1,8})*$").unwrap())
}

/// Decoder for the N-Triples serialization. A graph term is a syntax error.
pub struct NTriplesDecoder {
    base: Option<BaseIri>,
}

impl NTriplesDecoder {
    pub fn new(base: Option<BaseIri>) -> Self {
        Self { base }
    }
}

impl Decoder for NTriplesDecoder {
    fn decode(
        &self,
        input: Box<dyn BufRead + Send>,
        handler: &mut dyn StatementHandler,
    ) -> Result<(), DecodeError> {
        decode_lines(input, self.base.as_ref(), false, handler)
    }
}

/// Decoder for the N-Quads serialization: N-Triples plus an optional graph
/// term (IRI or blank node) before the closing dot.
pub struct NQuadsDecoder {
    base: Option<BaseIri>,
}

impl NQuadsDecoder {
    pub fn new(base: Option<BaseIri>) -> Self {
        Self { base }
    }
}

impl Decoder for NQuadsDecoder {
    fn decode(
        &self,
        input: Box<dyn BufRead + Send>,
        handler: &mut dyn StatementHandler,
    ) -> Result<(), DecodeError> {
        decode_lines(input, self.base.as_ref(), true, handler)
    }
}

fn decode_lines(
    mut input: Box<dyn BufRead + Send>,
    base: Option<&BaseIri>,
    allow_graph: bool,
    handler: &mut dyn StatementHandler,
) -> Result<(), DecodeError> {
    let mut line = String::new();
    let mut line_no: u64 = 0;
    loop {
        line.clear();
        let read = input.read_line(&mut line).map_err(|e| DecodeError::Io(e.to_string()))?;
        if read == 0 {
            return Ok(());
        }
        line_no += 1;
        if let Some(statement) = parse_statement_line(&line, base, allow_graph, line_no)? {
            handler.handle_statement(statement)?;
        }
    }
}

/// Parse one line into a statement. Blank lines and comment lines yield
/// `None`.
pub fn parse_statement_line(
    line: &str,
    base: Option<&BaseIri>,
    allow_graph: bool,
    line_no: u64,
) -> Result<Option<Statement>, DecodeError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let (subject, remaining) = parse_subject(trimmed, base, line_no)?;
    let (predicate, remaining) = parse_iri_ref(remaining, base, "predicate", line_no)?;
    let (object, remaining) = parse_object(remaining, base, line_no)?;

    let remaining = remaining.trim_start();
    let (graph, remaining) = if allow_graph {
        parse_optional_graph(remaining, base, line_no)?
    } else {
        if remaining.starts_with('<') || remaining.starts_with("_:") {
            return Err(syntax(line_no, "graph term is not allowed in N-Triples"));
        }
        (None, remaining)
    };

    let remaining = remaining.trim_start();
    let Some(rest) = remaining.strip_prefix('.') else {
        return Err(syntax(line_no, "expected '.' at end of statement"));
    };
    let rest = rest.trim();
    if !rest.is_empty() && !rest.starts_with('#') {
        return Err(syntax(line_no, &format!("unexpected trailing content: {}", rest)));
    }

    Ok(Some(Statement { subject, predicate, object, graph }))
}

fn syntax(line: u64, message: &str) -> DecodeError {
    DecodeError::Syntax { line, message: message.to_string() }
}

fn parse_subject<'a>(
    input: &'a str,
    base: Option<&BaseIri>,
    line_no: u64,
) -> Result<(Term, &'a str), DecodeError> {
    let input = input.trim_start();
    if input.starts_with('<') {
        let (iri, remaining) = parse_iri_ref(input, base, "subject", line_no)?;
        Ok((Term::Iri(iri), remaining))
    } else if input.starts_with("_:") {
        let (label, remaining) = parse_blank_node(input, line_no)?;
        Ok((Term::BlankNode(label), remaining))
    } else {
        Err(syntax(line_no, "subject must be an IRI or a blank node"))
    }
}

/// Parse an IRI reference enclosed in angle brackets, resolving it against
/// the base when relative.
fn parse_iri_ref<'a>(
    input: &'a str,
    base: Option<&BaseIri>,
    field: &str,
    line_no: u64,
) -> Result<(String, &'a str), DecodeError> {
    let input = input.trim_start();
    if !input.starts_with('<') {
        return Err(syntax(line_no, &format!("expected '<' to open the {} IRI", field)));
    }
    let Some(end) = input.find('>') else {
        return Err(syntax(line_no, &format!("missing closing '>' for the {} IRI", field)));
    };
    let raw = &input[1..end];
    if raw.chars().any(|c| c.is_whitespace() || c == '<' || c == '"') {
        return Err(syntax(line_no, &format!("invalid character in the {} IRI", field)));
    }
    Ok((resolve_reference(raw, base), &input[end + 1..]))
}

fn resolve_reference(reference: &str, base: Option<&BaseIri>) -> String {
    match base {
        Some(base) if !has_scheme(reference) => base.resolve(reference),
        _ => reference.to_string(),
    }
}

fn parse_blank_node<'a>(input: &'a str, line_no: u64) -> Result<(String, &'a str), DecodeError> {
    // The caller checked the "_:" prefix.
    let rest = &input[2..];
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(rest.len());
    if end == 0 {
        return Err(syntax(line_no, "empty blank node label"));
    }
    Ok((rest[..end].to_string(), &rest[end..]))
}

/// Parse an object term: IRI, blank node, or literal (plain, typed, or
/// language-tagged).
fn parse_object<'a>(
    input: &'a str,
    base: Option<&BaseIri>,
    line_no: u64,
) -> Result<(Term, &'a str), DecodeError> {
    let input = input.trim_start();
    if input.starts_with('<') {
        let (iri, remaining) = parse_iri_ref(input, base, "object", line_no)?;
        Ok((Term::Iri(iri), remaining))
    } else if input.starts_with("_:") {
        let (label, remaining) = parse_blank_node(input, line_no)?;
        Ok((Term::BlankNode(label), remaining))
    } else if input.starts_with('"') {
        parse_literal(input, base, line_no)
    } else {
        Err(syntax(line_no, "object must be an IRI, a blank node or a literal"))
    }
}

fn parse_literal<'a>(
    input: &'a str,
    base: Option<&BaseIri>,
    line_no: u64,
) -> Result<(Term, &'a str), DecodeError> {
    let mut iter = input.char_indices();
    iter.next(); // opening quote, checked by the caller

    let mut value = String::new();
    let mut close = None;
    while let Some((i, ch)) = iter.next() {
        match ch {
            '"' => {
                close = Some(i);
                break;
            }
            '\\' => match iter.next() {
                Some((_, 't')) => value.push('\t'),
                Some((_, 'b')) => value.push('\u{0008}'),
                Some((_, 'n')) => value.push('\n'),
                Some((_, 'r')) => value.push('\r'),
                Some((_, 'f')) => value.push('\u{000C}'),
                Some((_, '"')) => value.push('"'),
                Some((_, '\'')) => value.push('\''),
                Some((_, '\\')) => value.push('\\'),
                Some((_, 'u')) => value.push(parse_unicode_escape(&mut iter, 4, line_no)?),
                Some((_, 'U')) => value.push(parse_unicode_escape(&mut iter, 8, line_no)?),
                Some((_, other)) => {
                    return Err(syntax(line_no, &format!("invalid escape sequence '\\{}'", other)))
                }
                None => break,
            },
            other => value.push(other),
        }
    }
    let Some(close) = close else {
        return Err(syntax(line_no, "missing closing quote for literal"));
    };
    let after = &input[close + 1..];

    if let Some(rest) = after.strip_prefix("^^") {
        let (datatype, remaining) = parse_iri_ref(rest, base, "datatype", line_no)?;
        Ok((Term::Literal { value, datatype: Some(datatype), language: None }, remaining))
    } else if let Some(rest) = after.strip_prefix('@') {
        let end = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
            .unwrap_or(rest.len());
        let tag = &rest[..end];
        if !lang_tag_re().is_match(tag) {
            return Err(syntax(line_no, &format!("invalid language tag '@{}'", tag)));
        }
        Ok((
            Term::Literal { value, datatype: None, language: Some(tag.to_string()) },
            &rest[end..],
        ))
    } else {
        Ok((Term::Literal { value, datatype: None, language: None }, after))
    }
}

fn parse_unicode_escape(
    iter: &mut CharIndices<'_>,
    digits: usize,
    line_no: u64,
) -> Result<char, DecodeError> {
    let mut code = String::with_capacity(digits);
    for _ in 0..digits {
        match iter.next() {
            Some((_, c)) if c.is_ascii_hexdigit() => code.push(c),
            _ => return Err(syntax(line_no, "truncated unicode escape in literal")),
        }
    }
    let value = u32::from_str_radix(&code, 16)
        .map_err(|_| syntax(line_no, "invalid unicode escape in literal"))?;
    char::from_u32(value)
        .ok_or_else(|| syntax(line_no, &format!("invalid unicode code point U+{}", code)))
}

fn parse_optional_graph<'a>(
    input: &'a str,
    base: Option<&BaseIri>,
    line_no: u64,
) -> Result<(Option<String>, &'a str), DecodeError> {
    if input.starts_with('<') {
        let (iri, remaining) = parse_iri_ref(input, base, "graph", line_no)?;
        Ok((Some(iri), remaining))
    } else if input.starts_with("_:") {
        let (label, remaining) = parse_blank_node(input, line_no)?;
        Ok((Some(format!("_:{}", label)), remaining))
    } else {
        Ok((None, input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::decoder::StatementCollector;
    use std::io::Cursor;

    fn parse_triple(line: &str) -> Statement {
        parse_statement_line(line, None, false, 1).unwrap().unwrap()
    }

    fn parse_quad(line: &str) -> Statement {
        parse_statement_line(line, None, true, 1).unwrap().unwrap()
    }

    #[test]
    fn test_parse_uri_object() {
        let statement =
            parse_triple("<http://example.org/s> <http://example.org/p> <http://example.org/o> .");
        assert_eq!(statement.subject, Term::Iri("http://example.org/s".to_string()));
        assert_eq!(statement.predicate, "http://example.org/p");
        assert_eq!(statement.object, Term::Iri("http://example.org/o".to_string()));
        assert_eq!(statement.graph, None);
    }

    #[test]
    fn test_parse_plain_literal() {
        let statement =
            parse_triple(r#"<http://example.org/s> <http://example.org/name> "Temperature Sensor" ."#);
        assert_eq!(
            statement.object,
            Term::Literal { value: "Temperature Sensor".to_string(), datatype: None, language: None }
        );
    }

    #[test]
    fn test_parse_typed_literal() {
        let statement = parse_triple(
            r#"<http://example.org/s> <http://example.org/temperature> "23.5"^^<http://www.w3.org/2001/XMLSchema#decimal> ."#,
        );
        assert_eq!(
            statement.object,
            Term::Literal {
                value: "23.5".to_string(),
                datatype: Some("http://www.w3.org/2001/XMLSchema#decimal".to_string()),
                language: None,
            }
        );
    }

    #[test]
    fn test_parse_language_literal() {
        let statement =
            parse_triple(r#"<http://example.org/s> <http://example.org/label> "bonjour"@fr ."#);
        assert_eq!(
            statement.object,
            Term::Literal { value: "bonjour".to_string(), datatype: None, language: Some("fr".to_string()) }
        );
    }

    #[test]
    fn test_parse_blank_nodes() {
        let statement = parse_triple("_:a <http://example.org/knows> _:b .");
        assert_eq!(statement.subject, Term::BlankNode("a".to_string()));
        assert_eq!(statement.object, Term::BlankNode("b".to_string()));
    }

    #[test]
    fn test_parse_graph_term() {
        let statement = parse_quad(
            r#"<http://example.org/s> <http://example.org/p> "v" <http://example.org/g> ."#,
        );
        assert_eq!(statement.graph, Some("http://example.org/g".to_string()));
    }

    #[test]
    fn test_parse_blank_node_graph() {
        let statement = parse_quad(r#"<http://example.org/s> <http://example.org/p> "v" _:g1 ."#);
        assert_eq!(statement.graph, Some("_:g1".to_string()));
    }

    #[test]
    fn test_graph_rejected_in_ntriples() {
        let result = parse_statement_line(
            r#"<http://example.org/s> <http://example.org/p> "v" <http://example.org/g> ."#,
            None,
            false,
            4,
        );
        assert_eq!(
            result,
            Err(DecodeError::Syntax {
                line: 4,
                message: "graph term is not allowed in N-Triples".to_string()
            })
        );
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        assert_eq!(parse_statement_line("# a comment", None, false, 1), Ok(None));
        assert_eq!(parse_statement_line("   \n", None, false, 2), Ok(None));
    }

    #[test]
    fn test_trailing_comment_allowed() {
        let statement =
            parse_triple(r#"<http://example.org/s> <http://example.org/p> "v" . # note"#);
        assert_eq!(statement.predicate, "http://example.org/p");
    }

    #[test]
    fn test_literal_escapes() {
        let statement = parse_triple(
            r#"<http://example.org/s> <http://example.org/p> "line\n\"quoted\"\ttab A\\" ."#,
        );
        assert_eq!(
            statement.object,
            Term::Literal {
                value: "line\n\"quoted\"\ttab A\\".to_string(),
                datatype: None,
                language: None
            }
        );
    }

    #[test]
    fn test_invalid_escape_rejected() {
        let result = parse_statement_line(
            r#"<http://example.org/s> <http://example.org/p> "bad\q" ."#,
            None,
            false,
            7,
        );
        assert!(matches!(result, Err(DecodeError::Syntax { line: 7, .. })));
    }

    #[test]
    fn test_missing_dot_rejected() {
        let result = parse_statement_line(
            r#"<http://example.org/s> <http://example.org/p> "v""#,
            None,
            false,
            3,
        );
        assert_eq!(
            result,
            Err(DecodeError::Syntax {
                line: 3,
                message: "expected '.' at end of statement".to_string()
            })
        );
    }

    #[test]
    fn test_trailing_content_rejected() {
        let result = parse_statement_line(
            r#"<http://example.org/s> <http://example.org/p> "v" . extra"#,
            None,
            false,
            1,
        );
        assert!(matches!(result, Err(DecodeError::Syntax { .. })));
    }

    #[test]
    fn test_relative_iri_resolved_against_base() {
        let base = BaseIri::new("http://example.org/data/").unwrap();
        let statement =
            parse_statement_line("<s1> <p> <o> .", Some(&base), false, 1).unwrap().unwrap();
        assert_eq!(statement.subject, Term::Iri("http://example.org/data/s1".to_string()));
        assert_eq!(statement.predicate, "http://example.org/data/p");
        assert_eq!(statement.object, Term::Iri("http://example.org/data/o".to_string()));
    }

    #[test]
    fn test_relative_iri_passes_through_without_base() {
        let statement = parse_triple("<s1> <p> <o> .");
        assert_eq!(statement.subject, Term::Iri("s1".to_string()));
    }

    #[test]
    fn test_decoder_delivers_statements_in_order() {
        let data = "\
<http://example.org/s/0> <http://example.org/p> \"v0\" .
# interleaved comment
<http://example.org/s/1> <http://example.org/p> \"v1\" .

<http://example.org/s/2> <http://example.org/p> \"v2\" .
";
        let decoder = NTriplesDecoder::new(None);
        let mut collector = StatementCollector::new();
        decoder.decode(Box::new(Cursor::new(data)), &mut collector).unwrap();

        let subjects: Vec<String> = collector
            .statements()
            .iter()
            .map(|s| match &s.subject {
                Term::Iri(iri) => iri.clone(),
                other => panic!("unexpected subject {:?}", other),
            })
            .collect();
        assert_eq!(
            subjects,
            vec![
                "http://example.org/s/0".to_string(),
                "http://example.org/s/1".to_string(),
                "http://example.org/s/2".to_string(),
            ]
        );
    }

    #[test]
    fn test_decoder_reports_line_of_first_error() {
        let data = "<http://example.org/s> <http://example.org/p> \"v\" .\nnot rdf at all\n";
        let decoder = NTriplesDecoder::new(None);
        let mut collector = StatementCollector::new();
        let result = decoder.decode(Box::new(Cursor::new(data)), &mut collector);
        assert!(matches!(result, Err(DecodeError::Syntax { line: 2, .. })));
        assert_eq!(collector.statements().len(), 1);
    }
}
