//! Staged metadata edits
//!
//! The repository keeps system-managed triples alongside user metadata, so
//! single-predicate edits over the wire are unsafe. The safe primitive is
//! always: read the whole current graph, transform it in memory, write the
//! whole graph back. [`RdfChange`] is the value describing one staged edit;
//! [`apply_changes`] is the pure in-memory transform.

use oxrdf::{NamedNode, Term};

use super::graph::ResourceGraph;

/// One staged edit to a resource's metadata
#[derive(Debug, Clone, PartialEq)]
pub enum RdfChange {
    /// Add a triple, leaving existing triples with the predicate in place
    Add { predicate: NamedNode, object: Term },
    /// Remove every triple with the predicate, then add the new one
    Replace { predicate: NamedNode, object: Term },
    /// Remove every triple with the predicate
    Remove { predicate: NamedNode },
}

impl RdfChange {
    /// Convenience constructor for an add edit.
    pub fn add(predicate: NamedNode, object: impl Into<Term>) -> Self {
        Self::Add {
            predicate,
            object: object.into(),
        }
    }

    /// Convenience constructor for a replace edit.
    pub fn replace(predicate: NamedNode, object: impl Into<Term>) -> Self {
        Self::Replace {
            predicate,
            object: object.into(),
        }
    }

    /// Convenience constructor for a remove edit.
    pub fn remove(predicate: NamedNode) -> Self {
        Self::Remove { predicate }
    }
}

/// Apply staged edits to a graph, in staging order.
pub fn apply_changes(graph: &mut ResourceGraph, changes: &[RdfChange]) {
    for change in changes {
        match change {
            RdfChange::Add { predicate, object } => {
                graph.insert(predicate.clone(), object.clone());
            }
            RdfChange::Replace { predicate, object } => {
                graph.remove_predicate(predicate);
                graph.insert(predicate.clone(), object.clone());
            }
            RdfChange::Remove { predicate } => {
                graph.remove_predicate(predicate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::vocab;
    use oxrdf::Literal;

    fn title() -> NamedNode {
        vocab::dc("title")
    }

    fn lit(value: &str) -> Term {
        Term::Literal(Literal::new_simple_literal(value))
    }

    #[test]
    fn test_add_keeps_existing() {
        let mut graph = ResourceGraph::new();
        graph.insert(title(), lit("one"));

        apply_changes(&mut graph, &[RdfChange::add(title(), lit("two"))]);

        assert_eq!(graph.objects(&title()).len(), 2);
    }

    #[test]
    fn test_replace_erases_then_adds() {
        let mut graph = ResourceGraph::new();
        graph.insert(title(), lit("one"));
        graph.insert(title(), lit("two"));

        apply_changes(&mut graph, &[RdfChange::replace(title(), lit("three"))]);

        let objects = graph.objects(&title());
        assert_eq!(objects.len(), 1);
        assert_eq!(*objects[0], lit("three"));
    }

    #[test]
    fn test_remove_erases_all() {
        let mut graph = ResourceGraph::new();
        graph.insert(title(), lit("one"));
        graph.insert(vocab::dc("creator"), lit("me"));

        apply_changes(&mut graph, &[RdfChange::remove(title())]);

        assert!(graph.objects(&title()).is_empty());
        assert_eq!(graph.objects(&vocab::dc("creator")).len(), 1);
    }

    #[test]
    fn test_staging_order_is_fifo() {
        let mut graph = ResourceGraph::new();
        graph.insert(title(), lit("old"));

        // replace first, then add: both survive
        apply_changes(
            &mut graph,
            &[
                RdfChange::replace(title(), lit("new")),
                RdfChange::add(title(), lit("extra")),
            ],
        );
        assert_eq!(graph.objects(&title()).len(), 2);

        // add first, then replace: only the replacement survives
        let mut graph = ResourceGraph::new();
        graph.insert(title(), lit("old"));
        apply_changes(
            &mut graph,
            &[
                RdfChange::add(title(), lit("extra")),
                RdfChange::replace(title(), lit("new")),
            ],
        );
        let objects = graph.objects(&title());
        assert_eq!(objects.len(), 1);
        assert_eq!(*objects[0], lit("new"));
    }
}
