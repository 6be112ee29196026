//! Resource handle and metadata mutation queue
//!
//! A [`Resource`] is the client-side handle for one addressable node:
//! its URI, its parsed metadata graph, the raw response payload for
//! binaries, and the queue of staged metadata edits. Staging is pure
//! bookkeeping; `flush` performs the read-modify-write protocol: re-fetch
//! the current graph, apply every queued edit in staging order, PUT the
//! whole graph back. A failed flush leaves the queue untouched so the
//! caller can retry or inspect it.

use std::collections::HashMap;
use std::sync::OnceLock;

use bytes::Bytes;
use oxrdf::{NamedNode, Term};
use regex::Regex;
use reqwest::header::{HeaderMap, LINK};
use tracing::debug;

use super::registry::ResourceKind;
use super::webac::{Acl, Authorization};
use crate::error::{FcrepoError, FcrepoResult};
use crate::rdf::{apply_changes, vocab, RdfChange, ResourceGraph};
use crate::repo::Repository;

fn acl_link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"<([^>]*)>\s*;\s*rel="acl""#).expect("acl link pattern is valid")
    })
}

/// Client-side handle for one addressable repository resource
#[derive(Debug, Clone)]
pub struct Resource {
    uri: String,
    kind: ResourceKind,
    graph: ResourceGraph,
    content: Option<Bytes>,
    content_type: Option<String>,
    headers: HeaderMap,
    pending: Vec<RdfChange>,
}

impl Resource {
    /// Build a handle from a fetched response.
    pub(crate) fn from_parts(
        uri: &str,
        kind: ResourceKind,
        graph: ResourceGraph,
        content: Option<Bytes>,
        content_type: Option<String>,
        headers: HeaderMap,
    ) -> Self {
        Self {
            uri: uri.to_string(),
            kind,
            graph,
            content,
            content_type,
            headers,
            pending: Vec::new(),
        }
    }

    /// Build a handle for a freshly created resource.
    pub(crate) fn created(uri: String, kind: ResourceKind, graph: ResourceGraph) -> Self {
        Self {
            uri,
            kind,
            graph,
            content: None,
            content_type: None,
            headers: HeaderMap::new(),
            pending: Vec::new(),
        }
    }

    /// The resource's permanent URI.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The variant the typed-resource registry picked for this resource.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The resource's metadata graph.
    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    /// Raw response payload, for binaries and non-RDF responses.
    pub fn data(&self) -> Option<&Bytes> {
        self.content.as_ref()
    }

    /// Content type the server reported for the payload.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Response headers from the fetch that produced this handle.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    // -- graph queries ------------------------------------------------------

    /// One object with the given predicate, if any.
    pub fn rdf_get(&self, predicate: &NamedNode) -> Option<&Term> {
        self.graph.first_object(predicate)
    }

    /// All objects with the given predicate.
    pub fn rdf_get_all(&self, predicate: &NamedNode) -> Vec<&Term> {
        self.graph.objects(predicate)
    }

    /// All declared `rdf:type` values.
    pub fn rdf_types(&self) -> Vec<&NamedNode> {
        self.graph.types()
    }

    /// URIs of this resource's LDP children.
    pub fn children(&self) -> Vec<String> {
        self.graph
            .objects(&vocab::ldp_contains())
            .into_iter()
            .filter_map(|o| match o {
                Term::NamedNode(n) => Some(n.as_str().to_string()),
                _ => None,
            })
            .collect()
    }

    /// Dublin Core fields present on this resource, as a map.
    pub fn dc(&self) -> HashMap<String, String> {
        let mut fields = HashMap::new();
        for field in vocab::DC_FIELDS {
            if let Some(Term::Literal(value)) = self.graph.first_object(&vocab::dc(field)) {
                fields.insert(field.to_string(), value.value().to_string());
            }
        }
        fields
    }

    /// The effective ACL URI from the response's `Link: rel="acl"` header.
    pub fn acl_link(&self) -> Option<String> {
        self.headers
            .get_all(LINK)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|v| {
                acl_link_pattern()
                    .captures(v)
                    .map(|c| c[1].to_string())
            })
    }

    // -- staged mutation ----------------------------------------------------

    /// Stage an add: existing triples with the predicate are kept.
    pub fn stage_add(&mut self, predicate: NamedNode, object: impl Into<Term>) {
        self.pending.push(RdfChange::add(predicate, object));
    }

    /// Stage a replace: existing triples with the predicate are erased.
    pub fn stage_replace(&mut self, predicate: NamedNode, object: impl Into<Term>) {
        self.pending.push(RdfChange::replace(predicate, object));
    }

    /// Stage a removal of every triple with the predicate.
    pub fn stage_remove(&mut self, predicate: NamedNode) {
        self.pending.push(RdfChange::remove(predicate));
    }

    /// The staged edits not yet flushed.
    pub fn pending(&self) -> &[RdfChange] {
        &self.pending
    }

    /// Apply the staged edits against the server and clear the queue.
    ///
    /// Calling flush with nothing staged is a caller error. On failure the
    /// queue keeps its contents and the remote graph is unchanged.
    pub async fn flush(&mut self, repo: &Repository) -> FcrepoResult<()> {
        if self.pending.is_empty() {
            return Err(FcrepoError::NothingToFlush(self.uri.clone()));
        }
        let changes = std::mem::take(&mut self.pending);
        match self.write_through(repo, &changes).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.pending = changes;
                Err(err)
            }
        }
    }

    /// Apply an explicit list of edits against the server.
    ///
    /// The same read-modify-write protocol as `flush`, driven by a change
    /// list the caller assembled as a value. The staged queue is not
    /// consulted or cleared.
    pub async fn update(&mut self, repo: &Repository, changes: Vec<RdfChange>) -> FcrepoResult<()> {
        if changes.is_empty() {
            return Err(FcrepoError::NothingToFlush(self.uri.clone()));
        }
        self.write_through(repo, &changes).await
    }

    async fn write_through(&mut self, repo: &Repository, changes: &[RdfChange]) -> FcrepoResult<()> {
        debug!(uri = %self.uri, edits = changes.len(), "writing metadata changes");
        let mut fresh = repo.refresh_graph(&self.uri).await?;
        apply_changes(&mut fresh, changes);
        repo.put_graph(&self.uri, &fresh).await?;
        self.graph = fresh;
        Ok(())
    }

    // -- typed views --------------------------------------------------------

    /// View this resource as an ACL, if the registry classified it as one.
    pub fn into_acl(self) -> Option<Acl> {
        (self.kind == ResourceKind::Acl).then(|| Acl::from_resource(self))
    }

    /// View this resource as an authorization, if classified as one.
    pub fn into_authorization(self) -> Option<Authorization> {
        (self.kind == ResourceKind::Authorization).then(|| Authorization::from_resource(self))
    }
}
