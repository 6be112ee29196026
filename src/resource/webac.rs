//! WebAC access control
//!
//! An [`Acl`] is an ordinary container typed `acl:Acl`; each grant is an
//! [`Authorization`] child resource encoding one (agent, mode, target)
//! triple-set. The authorization's path under its ACL is a pure function
//! of agent and mode, so re-granting the same pair overwrites instead of
//! accumulating duplicates. Enforcement happens entirely on the server;
//! this module only builds and reads the RDF describing authorizations.

use std::collections::HashMap;
use std::fmt;

use oxrdf::{Literal, NamedNode, Term};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::handle::Resource;
use super::registry::ResourceKind;
use super::relations;
use crate::error::{FcrepoError, FcrepoResult};
use crate::rdf::{vocab, RdfChange, ResourceGraph};
use crate::repo::{path_concat, CreateOptions, Method, Repository};

/// Characters escaped when an agent name becomes a path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// WebAC access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    Read,
    Write,
}

impl AccessMode {
    /// The mode's local name.
    pub fn as_str(self) -> &'static str {
        match self {
            AccessMode::Read => "Read",
            AccessMode::Write => "Write",
        }
    }

    /// The mode's WebAC IRI.
    pub fn iri(self) -> NamedNode {
        vocab::webac(self.as_str())
    }

    /// Decode a mode from an `acl:mode` object.
    ///
    /// An IRI ending in `Read` is Read; any other named node is Write.
    pub fn from_term(term: &Term) -> Option<Self> {
        match term {
            Term::NamedNode(n) if n.as_str().ends_with("Read") => Some(AccessMode::Read),
            Term::NamedNode(_) => Some(AccessMode::Write),
            _ => None,
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nested permission table: target URI -> agent -> modes
pub type AclMap = HashMap<String, HashMap<String, Vec<AccessMode>>>;

/// Access control list resource
#[derive(Debug, Clone)]
pub struct Acl {
    resource: Resource,
}

impl Acl {
    pub(crate) fn from_resource(resource: Resource) -> Self {
        Self { resource }
    }

    /// The ACL's own URI.
    pub fn uri(&self) -> &str {
        self.resource.uri()
    }

    /// The underlying resource handle.
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Deterministic child segment for an (agent, mode) authorization.
    pub fn auth_segment(agent: &str, mode: AccessMode) -> String {
        format!("{}_{}", utf8_percent_encode(agent, SEGMENT), mode.as_str())
    }

    /// Full URI of the authorization for an (agent, mode) pair.
    pub fn auth_uri(&self, agent: &str, mode: AccessMode) -> String {
        path_concat(self.uri(), &Self::auth_segment(agent, mode))
    }

    /// Grant an agent an access mode over a target resource.
    ///
    /// Writes the target's `accessControl` pointer at this ACL (replacing
    /// any previous pointer) and creates the authorization child at its
    /// deterministic path, overwriting an existing grant for the pair.
    pub async fn grant(
        &self,
        repo: &Repository,
        agent: &str,
        mode: AccessMode,
        target_uri: &str,
    ) -> FcrepoResult<Authorization> {
        let mut target = repo
            .get(target_uri)
            .await?
            .ok_or_else(|| repo.resource_error(target_uri, Method::Get, StatusCode::NOT_FOUND))?;
        relations::validate("accessControl", target.kind(), ResourceKind::Acl)?;
        relations::validate("accessTo", ResourceKind::Authorization, target.kind())?;

        let acl_node = NamedNode::new(self.uri())
            .map_err(|e| FcrepoError::RdfParse(format!("ACL URI '{}': {e}", self.uri())))?;
        target
            .update(
                repo,
                vec![RdfChange::replace(
                    vocab::webac("accessControl"),
                    Term::NamedNode(acl_node),
                )],
            )
            .await?;

        debug!(agent = %agent, mode = %mode, target = %target_uri, acl = %self.uri(), "granting access");
        let graph = authorization_graph(agent, mode, target_uri)?;
        let resource = repo
            .add_container(
                self.uri(),
                graph,
                CreateOptions {
                    path: Some(Self::auth_segment(agent, mode)),
                    force: true,
                    ..Default::default()
                },
            )
            .await?;
        Ok(Authorization::from_resource(resource))
    }

    /// Revoke an agent's access mode.
    ///
    /// Deletes and obliterates the deterministic authorization child if it
    /// exists; returns whether anything was removed. The target's
    /// `accessControl` pointer stays, since other authorizations under
    /// this ACL may still apply.
    pub async fn revoke(
        &self,
        repo: &Repository,
        agent: &str,
        mode: AccessMode,
    ) -> FcrepoResult<bool> {
        let auth_uri = self.auth_uri(agent, mode);
        if repo.get(&auth_uri).await?.is_none() {
            debug!(uri = %auth_uri, "no authorization to revoke");
            return Ok(false);
        }
        repo.delete(&auth_uri).await?;
        repo.obliterate(&auth_uri).await?;
        Ok(true)
    }

    /// Reconstruct the permission table from this ACL's children.
    ///
    /// Multiple authorizations for the same target and agent contribute
    /// multiple modes.
    pub async fn acls(&self, repo: &Repository) -> FcrepoResult<AclMap> {
        let fresh = repo
            .get(self.uri())
            .await?
            .ok_or_else(|| repo.resource_error(self.uri(), Method::Get, StatusCode::NOT_FOUND))?;

        let mut table: AclMap = HashMap::new();
        for child in fresh.children() {
            let Some(resource) = repo.get(&child).await? else {
                continue;
            };
            let Some(authorization) = resource.into_authorization() else {
                warn!(uri = %child, "ACL child is not an authorization, skipping");
                continue;
            };
            let (agent, mode, target) = authorization.decode()?;
            table
                .entry(target)
                .or_default()
                .entry(agent)
                .or_default()
                .push(mode);
        }
        Ok(table)
    }
}

/// Authorization resource under an ACL
#[derive(Debug, Clone)]
pub struct Authorization {
    resource: Resource,
}

impl Authorization {
    pub(crate) fn from_resource(resource: Resource) -> Self {
        Self { resource }
    }

    /// The authorization's own URI.
    pub fn uri(&self) -> &str {
        self.resource.uri()
    }

    /// The underlying resource handle.
    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Decode the (agent, mode, target) triple-set this resource encodes.
    pub fn decode(&self) -> FcrepoResult<(String, AccessMode, String)> {
        let graph = self.resource.graph();

        let agent = match graph.first_object(&vocab::webac("agent")) {
            Some(Term::Literal(l)) => l.value().to_string(),
            Some(Term::NamedNode(n)) => n.as_str().to_string(),
            _ => {
                return Err(FcrepoError::RdfParse(format!(
                    "authorization {} has no agent",
                    self.uri()
                )))
            }
        };
        let mode = graph
            .first_object(&vocab::webac("mode"))
            .and_then(AccessMode::from_term)
            .ok_or_else(|| {
                FcrepoError::RdfParse(format!("authorization {} has no mode", self.uri()))
            })?;
        let target = match graph.first_object(&vocab::webac("accessTo")) {
            Some(Term::NamedNode(n)) => n.as_str().to_string(),
            _ => {
                return Err(FcrepoError::RdfParse(format!(
                    "authorization {} has no accessTo target",
                    self.uri()
                )))
            }
        };
        Ok((agent, mode, target))
    }
}

/// Build the RDF for one authorization.
fn authorization_graph(agent: &str, mode: AccessMode, target_uri: &str) -> FcrepoResult<ResourceGraph> {
    let target = NamedNode::new(target_uri)
        .map_err(|e| FcrepoError::RdfParse(format!("target URI '{target_uri}': {e}")))?;
    let mut graph = ResourceGraph::new();
    graph.ensure_type(vocab::webac("Authorization"));
    graph.insert(vocab::webac("accessTo"), Term::NamedNode(target));
    graph.insert(vocab::webac("mode"), Term::NamedNode(mode.iri()));
    graph.insert(
        vocab::webac("agent"),
        Term::Literal(Literal::new_simple_literal(agent)),
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_segment_is_deterministic() {
        assert_eq!(Acl::auth_segment("alice", AccessMode::Read), "alice_Read");
        assert_eq!(Acl::auth_segment("alice", AccessMode::Write), "alice_Write");
        assert_eq!(
            Acl::auth_segment("alice", AccessMode::Read),
            Acl::auth_segment("alice", AccessMode::Read)
        );
    }

    #[test]
    fn test_auth_segment_escapes_unsafe_agents() {
        assert_eq!(
            Acl::auth_segment("dev/ops", AccessMode::Write),
            "dev%2Fops_Write"
        );
        assert_eq!(
            Acl::auth_segment("org:staff", AccessMode::Read),
            "org%3Astaff_Read"
        );
    }

    #[test]
    fn test_mode_decoding() {
        assert_eq!(
            AccessMode::from_term(&Term::NamedNode(vocab::webac("Read"))),
            Some(AccessMode::Read)
        );
        assert_eq!(
            AccessMode::from_term(&Term::NamedNode(vocab::webac("Write"))),
            Some(AccessMode::Write)
        );
        assert_eq!(
            AccessMode::from_term(&Term::Literal(Literal::new_simple_literal("Read"))),
            None
        );
    }

    #[test]
    fn test_authorization_graph_contents() {
        let graph =
            authorization_graph("alice", AccessMode::Read, "http://h/rest/target").unwrap();
        assert!(graph.has_type(&vocab::webac("Authorization")));
        assert_eq!(
            graph.first_object(&vocab::webac("mode")),
            Some(&Term::NamedNode(vocab::webac("Read")))
        );
        assert_eq!(
            graph.first_object(&vocab::webac("agent")),
            Some(&Term::Literal(Literal::new_simple_literal("alice")))
        );
        assert_eq!(graph.len(), 4);
    }
}
