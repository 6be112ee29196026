//! Per-resource RDF graph
//!
//! A [`ResourceGraph`] holds the triples describing one addressable
//! repository resource. The graph carries a distinguished subject: the
//! resource's own URI, or the empty relative IRI `<>` for a graph built in
//! memory before the server has assigned a path. Triples about other
//! subjects (as returned by the server) are kept but the query helpers only
//! look at the resource's own triples.

use std::collections::{HashMap, HashSet};

use oxrdf::{Literal, NamedNode, Subject, Term, Triple};

use super::turtle;
use super::vocab;
use crate::error::{FcrepoError, FcrepoResult};

/// RDF graph scoped to a single resource
#[derive(Debug, Clone)]
pub struct ResourceGraph {
    subject: NamedNode,
    triples: HashSet<Triple>,
}

impl Default for ResourceGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceGraph {
    /// Create an empty graph with the unassigned relative subject `<>`.
    pub fn new() -> Self {
        Self {
            subject: NamedNode::new_unchecked(""),
            triples: HashSet::new(),
        }
    }

    /// Create an empty graph whose subject is an assigned URI.
    pub fn with_subject(uri: &str) -> FcrepoResult<Self> {
        let subject = NamedNode::new(uri)
            .map_err(|e| FcrepoError::RdfParse(format!("invalid subject IRI '{uri}': {e}")))?;
        Ok(Self {
            subject,
            triples: HashSet::new(),
        })
    }

    /// Parse a Turtle document into a graph scoped to `uri`.
    pub fn from_turtle(text: &str, uri: &str) -> FcrepoResult<Self> {
        let mut graph = Self::with_subject(uri)?;
        for triple in turtle::parse(text)? {
            graph.triples.insert(triple);
        }
        Ok(graph)
    }

    /// Serialize every triple in the graph as Turtle.
    pub fn to_turtle(&self) -> FcrepoResult<String> {
        turtle::serialize(self.triples.iter())
    }

    /// The resource's own subject node.
    pub fn subject(&self) -> &NamedNode {
        &self.subject
    }

    fn is_own(&self, triple: &Triple) -> bool {
        match &triple.subject {
            Subject::NamedNode(n) => *n == self.subject,
            _ => false,
        }
    }

    /// Add a triple about this resource.
    pub fn insert(&mut self, predicate: NamedNode, object: impl Into<Term>) {
        self.triples
            .insert(Triple::new(self.subject.clone(), predicate, object));
    }

    /// Add an arbitrary triple.
    pub fn insert_triple(&mut self, triple: Triple) {
        self.triples.insert(triple);
    }

    /// Remove every own-subject triple with the given predicate.
    ///
    /// Returns the number of triples removed.
    pub fn remove_predicate(&mut self, predicate: &NamedNode) -> usize {
        let before = self.triples.len();
        let subject = self.subject.clone();
        self.triples.retain(|t| {
            !(t.predicate == *predicate
                && matches!(&t.subject, Subject::NamedNode(n) if *n == subject))
        });
        before - self.triples.len()
    }

    /// All objects of own-subject triples with the given predicate.
    pub fn objects(&self, predicate: &NamedNode) -> Vec<&Term> {
        self.triples
            .iter()
            .filter(|t| self.is_own(t) && t.predicate == *predicate)
            .map(|t| &t.object)
            .collect()
    }

    /// One object of an own-subject triple with the given predicate.
    pub fn first_object(&self, predicate: &NamedNode) -> Option<&Term> {
        self.triples
            .iter()
            .find(|t| self.is_own(t) && t.predicate == *predicate)
            .map(|t| &t.object)
    }

    /// All `rdf:type` values declared for this resource.
    pub fn types(&self) -> Vec<&NamedNode> {
        self.objects(&vocab::rdf_type())
            .into_iter()
            .filter_map(|o| match o {
                Term::NamedNode(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    /// Whether this resource declares the given `rdf:type`.
    pub fn has_type(&self, rdf_type: &NamedNode) -> bool {
        self.types().iter().any(|t| **t == *rdf_type)
    }

    /// Add an `rdf:type` triple unless one with the same type already exists.
    pub fn ensure_type(&mut self, rdf_type: NamedNode) {
        if !self.has_type(&rdf_type) {
            self.insert(vocab::rdf_type(), Term::NamedNode(rdf_type));
        }
    }

    /// Rewrite own-subject triples onto a new subject.
    ///
    /// Used after creation, when the server has assigned the resource its
    /// permanent URI and the in-memory graph still speaks about `<>`.
    pub fn rebase(&mut self, new_subject: NamedNode) {
        let old = self.subject.clone();
        let rebased: HashSet<Triple> = self
            .triples
            .drain()
            .map(|t| match &t.subject {
                Subject::NamedNode(n) if *n == old => {
                    Triple::new(new_subject.clone(), t.predicate, t.object)
                }
                _ => t,
            })
            .collect();
        self.triples = rebased;
        self.subject = new_subject;
    }

    /// Iterate over every triple in the graph.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Number of triples in the graph.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Whether the graph holds no triples.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }
}

/// Build a Dublin Core metadata graph from a field map.
///
/// Only the fifteen DC element names are consulted; other keys are ignored.
pub fn dc_graph(metadata: &HashMap<String, String>) -> ResourceGraph {
    let mut graph = ResourceGraph::new();
    for field in vocab::DC_FIELDS {
        if let Some(value) = metadata.get(field) {
            graph.insert(
                vocab::dc(field),
                Term::Literal(Literal::new_simple_literal(value)),
            );
        }
    }
    graph
}

/// Build a graph about the unassigned subject from (predicate, object) pairs.
pub fn build_graph(pairs: Vec<(NamedNode, Term)>) -> ResourceGraph {
    let mut graph = ResourceGraph::new();
    for (predicate, object) in pairs {
        graph.insert(predicate, object);
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title() -> NamedNode {
        vocab::dc("title")
    }

    #[test]
    fn test_insert_and_query() {
        let mut graph = ResourceGraph::new();
        graph.insert(title(), Term::Literal(Literal::new_simple_literal("One")));
        graph.insert(title(), Term::Literal(Literal::new_simple_literal("Two")));

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.objects(&title()).len(), 2);
        assert!(graph.first_object(&title()).is_some());
        assert!(graph.first_object(&vocab::dc("creator")).is_none());
    }

    #[test]
    fn test_remove_predicate_only_own_subject() {
        let mut graph = ResourceGraph::with_subject("http://example.org/a").unwrap();
        graph.insert(title(), Term::Literal(Literal::new_simple_literal("mine")));
        graph.insert_triple(Triple::new(
            NamedNode::new("http://example.org/other").unwrap(),
            title(),
            Term::Literal(Literal::new_simple_literal("theirs")),
        ));

        assert_eq!(graph.remove_predicate(&title()), 1);
        assert_eq!(graph.len(), 1);
        assert!(graph.objects(&title()).is_empty());
    }

    #[test]
    fn test_ensure_type_never_duplicates() {
        let mut graph = ResourceGraph::new();
        let acl = vocab::webac("Acl");
        graph.ensure_type(acl.clone());
        graph.ensure_type(acl.clone());

        assert_eq!(graph.len(), 1);
        assert!(graph.has_type(&acl));
    }

    #[test]
    fn test_rebase() {
        let mut graph = ResourceGraph::new();
        graph.insert(title(), Term::Literal(Literal::new_simple_literal("x")));

        let assigned = NamedNode::new("http://example.org/new").unwrap();
        graph.rebase(assigned.clone());

        assert_eq!(graph.subject(), &assigned);
        assert_eq!(graph.objects(&title()).len(), 1);
    }

    #[test]
    fn test_dc_graph_ignores_unknown_fields() {
        let metadata = HashMap::from([
            ("title".to_string(), "A title".to_string()),
            ("creator".to_string(), "A creator".to_string()),
            ("flavour".to_string(), "ignored".to_string()),
        ]);
        let graph = dc_graph(&metadata);
        assert_eq!(graph.len(), 2);
        assert!(graph.first_object(&vocab::dc("title")).is_some());
    }
}
