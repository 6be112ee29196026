//! Typed resource registry
//!
//! A fetched graph is dispatched to a resource kind by looking its
//! declared `rdf:type` values up in a registry populated explicitly at
//! startup. Classification is a pure function of the graph and the
//! registry, with plain `Container` as the fallback.

use std::collections::HashMap;

use oxrdf::NamedNode;
use tracing::debug;

use crate::rdf::{vocab, ResourceGraph};

/// The resource variants the client distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// RDF-bearing container, the default
    Container,
    /// WebAC access control list
    Acl,
    /// WebAC authorization under an ACL
    Authorization,
    /// Opaque byte payload without RDF metadata
    Binary,
}

impl ResourceKind {
    /// The `rdf:type` a freshly built resource of this kind must declare.
    pub fn declared_type(self) -> Option<NamedNode> {
        match self {
            ResourceKind::Acl => Some(vocab::webac("Acl")),
            ResourceKind::Authorization => Some(vocab::webac("Authorization")),
            ResourceKind::Container | ResourceKind::Binary => None,
        }
    }

    /// Short tag for logs and error messages.
    pub fn tag(self) -> &'static str {
        match self {
            ResourceKind::Container => "container",
            ResourceKind::Acl => "acl",
            ResourceKind::Authorization => "authorization",
            ResourceKind::Binary => "binary",
        }
    }
}

/// Mapping from RDF type IRI to resource kind
#[derive(Debug)]
pub struct TypeRegistry {
    by_type: HashMap<String, ResourceKind>,
}

impl TypeRegistry {
    /// Create a registry preloaded with the WebAC kinds.
    pub fn new() -> Self {
        let mut registry = Self {
            by_type: HashMap::new(),
        };
        registry.register(vocab::webac("Acl").as_str(), ResourceKind::Acl);
        registry.register(
            vocab::webac("Authorization").as_str(),
            ResourceKind::Authorization,
        );
        registry
    }

    /// Create a registry with no entries.
    pub fn empty() -> Self {
        Self {
            by_type: HashMap::new(),
        }
    }

    /// Register a kind for an RDF type IRI.
    pub fn register(&mut self, type_iri: impl Into<String>, kind: ResourceKind) {
        let type_iri = type_iri.into();
        debug!(rdf_type = %type_iri, kind = %kind.tag(), "registered resource kind");
        self.by_type.insert(type_iri, kind);
    }

    /// Look up the kind registered for an RDF type IRI.
    pub fn kind_for(&self, type_iri: &str) -> Option<ResourceKind> {
        self.by_type.get(type_iri).copied()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the resource kind for a graph's declared types.
pub fn classify(graph: &ResourceGraph, registry: &TypeRegistry) -> ResourceKind {
    let mut kind = ResourceKind::Container;
    for rdf_type in graph.types() {
        if let Some(registered) = registry.kind_for(rdf_type.as_str()) {
            kind = registered;
        }
    }
    kind
}
