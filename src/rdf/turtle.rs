//! Turtle wire format
//!
//! The repository exchanges resource metadata as `text/turtle`. Parsing and
//! serialization go through the rio toolkit, converting between the rio
//! model types and the oxrdf terms the rest of the crate uses.

use std::io::{BufReader, Cursor};

use oxrdf::{BlankNode, Literal, NamedNode, Subject, Term, Triple};
use rio_api::formatter::TriplesFormatter;
use rio_api::parser::TriplesParser;
use rio_turtle::{TurtleFormatter, TurtleParser};

use crate::error::{FcrepoError, FcrepoResult};

/// Parse a Turtle document into oxrdf triples.
pub fn parse(input: &str) -> FcrepoResult<Vec<Triple>> {
    let cursor = Cursor::new(input);
    let mut reader = BufReader::new(cursor);
    let mut parser = TurtleParser::new(&mut reader, None);

    let mut triples = Vec::new();

    let res: Result<(), rio_turtle::TurtleError> = parser.parse_all(&mut |t| {
        let subject = convert_subject(t.subject).map_err(invalid_data)?;
        let predicate = convert_predicate(t.predicate).map_err(invalid_data)?;
        let object = convert_object(t.object).map_err(invalid_data)?;

        triples.push(Triple::new(subject, predicate, object));
        Ok(())
    });

    match res {
        Ok(_) => Ok(triples),
        Err(e) => Err(FcrepoError::RdfParse(e.to_string())),
    }
}

/// Serialize triples as a Turtle document.
pub fn serialize<'a>(triples: impl Iterator<Item = &'a Triple>) -> FcrepoResult<String> {
    let mut output = Vec::new();
    let mut formatter = TurtleFormatter::new(&mut output);

    for triple in triples {
        let s_node;
        let s_blank;
        let subject = match &triple.subject {
            Subject::NamedNode(n) => {
                s_node = rio_api::model::NamedNode { iri: n.as_str() };
                rio_api::model::Subject::NamedNode(s_node)
            }
            Subject::BlankNode(b) => {
                s_blank = rio_api::model::BlankNode { id: b.as_str() };
                rio_api::model::Subject::BlankNode(s_blank)
            }
            #[allow(unreachable_patterns)]
            _ => {
                return Err(FcrepoError::RdfSerialize(
                    "unsupported subject term".to_string(),
                ))
            }
        };

        let p_node = rio_api::model::NamedNode {
            iri: triple.predicate.as_str(),
        };

        let o_node;
        let o_blank;
        let o_datatype;
        let object = match &triple.object {
            Term::NamedNode(n) => {
                o_node = rio_api::model::NamedNode { iri: n.as_str() };
                rio_api::model::Term::NamedNode(o_node)
            }
            Term::BlankNode(b) => {
                o_blank = rio_api::model::BlankNode { id: b.as_str() };
                rio_api::model::Term::BlankNode(o_blank)
            }
            Term::Literal(l) => {
                if let Some(language) = l.language() {
                    rio_api::model::Term::Literal(rio_api::model::Literal::LanguageTaggedString {
                        value: l.value(),
                        language,
                    })
                } else if l.datatype() == oxrdf::vocab::xsd::STRING {
                    rio_api::model::Term::Literal(rio_api::model::Literal::Simple {
                        value: l.value(),
                    })
                } else {
                    o_datatype = l.datatype().into_owned();
                    rio_api::model::Term::Literal(rio_api::model::Literal::Typed {
                        value: l.value(),
                        datatype: rio_api::model::NamedNode {
                            iri: o_datatype.as_str(),
                        },
                    })
                }
            }
            #[allow(unreachable_patterns)]
            _ => {
                return Err(FcrepoError::RdfSerialize(
                    "unsupported object term".to_string(),
                ))
            }
        };

        let rio_triple = rio_api::model::Triple {
            subject,
            predicate: p_node,
            object,
        };

        formatter
            .format(&rio_triple)
            .map_err(|e| FcrepoError::RdfSerialize(e.to_string()))?;
    }

    formatter
        .finish()
        .map_err(|e| FcrepoError::RdfSerialize(e.to_string()))?;

    String::from_utf8(output).map_err(|e| FcrepoError::RdfSerialize(e.to_string()))
}

fn invalid_data(e: FcrepoError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
}

fn convert_subject(s: rio_api::model::Subject) -> FcrepoResult<Subject> {
    match s {
        rio_api::model::Subject::NamedNode(n) => Ok(Subject::NamedNode(
            NamedNode::new(n.iri).map_err(|e| FcrepoError::RdfParse(e.to_string()))?,
        )),
        rio_api::model::Subject::BlankNode(b) => Ok(Subject::BlankNode(
            BlankNode::new(b.id).map_err(|e| FcrepoError::RdfParse(e.to_string()))?,
        )),
        _ => Err(FcrepoError::RdfParse(
            "unsupported subject type".to_string(),
        )),
    }
}

fn convert_predicate(p: rio_api::model::NamedNode) -> FcrepoResult<NamedNode> {
    NamedNode::new(p.iri).map_err(|e| FcrepoError::RdfParse(e.to_string()))
}

fn convert_object(o: rio_api::model::Term) -> FcrepoResult<Term> {
    match o {
        rio_api::model::Term::NamedNode(n) => Ok(Term::NamedNode(
            NamedNode::new(n.iri).map_err(|e| FcrepoError::RdfParse(e.to_string()))?,
        )),
        rio_api::model::Term::BlankNode(b) => Ok(Term::BlankNode(
            BlankNode::new(b.id).map_err(|e| FcrepoError::RdfParse(e.to_string()))?,
        )),
        rio_api::model::Term::Literal(l) => match l {
            rio_api::model::Literal::Simple { value } => {
                Ok(Term::Literal(Literal::new_simple_literal(value)))
            }
            rio_api::model::Literal::LanguageTaggedString { value, language } => {
                Ok(Term::Literal(
                    Literal::new_language_tagged_literal(value, language)
                        .map_err(|e| FcrepoError::RdfParse(e.to_string()))?,
                ))
            }
            rio_api::model::Literal::Typed { value, datatype } => {
                let datatype = NamedNode::new(datatype.iri)
                    .map_err(|e| FcrepoError::RdfParse(e.to_string()))?;
                Ok(Term::Literal(Literal::new_typed_literal(value, datatype)))
            }
        },
        _ => Err(FcrepoError::RdfParse("unsupported object type".to_string())),
    }
}
