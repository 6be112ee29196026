//! Repository connection and resource lifecycle operations
//!
//! [`Repository`] owns the HTTP client, the configured identities, the
//! URI/path translator, the typed-resource registry and the single
//! active-transaction slot. The resource lifecycle (fetch, deterministic
//! and server-assigned creation, delete, obliterate) lives here; metadata
//! mutation is on [`crate::resource::Resource`] and access control on
//! [`crate::resource::Acl`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::StatusCode;
use tracing::{debug, info};

use super::paths::{path_concat, PathMap};
use super::transport::{Method, SLUG};
use super::RDF_MIME;
use crate::config::RepositoryConfig;
use crate::error::{FcrepoError, FcrepoResult};
use crate::rdf::{vocab, ResourceGraph};
use crate::resource::{classify, Acl, Resource, ResourceKind, TypeRegistry};

/// Options for container creation
///
/// `path` selects the deterministic mode (PUT to `parent/path` after an
/// existence check, overwriting only with `force`); otherwise the server
/// assigns the path via POST, with `slug` as an advisory hint.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Advisory last path segment for server-assigned creation
    pub slug: Option<String>,
    /// Deterministic path relative to the parent
    pub path: Option<String>,
    /// Overwrite an existing resource at the deterministic path
    pub force: bool,
}

/// Connection to one Fedora repository
#[derive(Debug)]
pub struct Repository {
    pub(crate) config: RepositoryConfig,
    pub(crate) paths: PathMap,
    pub(crate) http: reqwest::Client,
    current: String,
    registry: TypeRegistry,
    active_tx: Mutex<Option<String>>,
}

impl Repository {
    /// Open a connection acting as the named user.
    pub fn connect(config: RepositoryConfig, user: &str) -> FcrepoResult<Self> {
        Self::with_registry(config, user, TypeRegistry::new())
    }

    /// Open a connection with a caller-extended typed-resource registry.
    pub fn with_registry(
        config: RepositoryConfig,
        user: &str,
        registry: TypeRegistry,
    ) -> FcrepoResult<Self> {
        config.validate()?;
        if !config.users.contains_key(user) {
            return Err(FcrepoError::UnknownUser(user.to_string()));
        }
        let paths = PathMap::new(&config.uri)?;
        info!(base = %paths.base(), user = %user, "repository connection");
        Ok(Self {
            config,
            paths,
            http: reqwest::Client::new(),
            current: user.to_string(),
            registry,
            active_tx: Mutex::new(None),
        })
    }

    /// The normalized base URI, with trailing slash.
    pub fn base_uri(&self) -> &str {
        self.paths.base()
    }

    /// The name of the acting identity.
    pub fn current_user(&self) -> &str {
        &self.current
    }

    /// Switch the acting identity for subsequent calls.
    pub fn set_user(&mut self, user: &str) -> FcrepoResult<()> {
        if !self.config.users.contains_key(user) {
            return Err(FcrepoError::UnknownUser(user.to_string()));
        }
        debug!(user = %user, "switching acting identity");
        self.current = user.to_string();
        Ok(())
    }

    /// The typed-resource registry consulted by `get`.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Convert a REST path to an absolute URI.
    pub fn path_to_uri(&self, path: &str) -> String {
        self.paths.path_to_uri(path)
    }

    /// Convert an absolute URI to a REST path, failing for foreign URIs.
    pub fn uri_to_path(&self, uri: &str) -> FcrepoResult<String> {
        self.paths.uri_to_path(uri)
    }

    // -- transaction slot ---------------------------------------------------

    fn tx_slot(&self) -> MutexGuard<'_, Option<String>> {
        self.active_tx.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// URI of the active transaction, if one is open.
    pub fn active_transaction(&self) -> Option<String> {
        self.tx_slot().clone()
    }

    pub(crate) fn set_active_transaction(&self, uri: Option<String>) {
        *self.tx_slot() = uri;
    }

    // -- fetch --------------------------------------------------------------

    /// Retrieve the resource at a URI.
    ///
    /// Absence is not exceptional: a 404 yields `None`. A Turtle response
    /// is parsed and dispatched through the typed-resource registry; any
    /// other content type yields a binary-kind resource with the raw bytes
    /// retained. Every other status is a `Resource` error.
    pub async fn get(&self, uri: &str) -> FcrepoResult<Option<Resource>> {
        let response = self.api(uri, Method::Get, HeaderMap::new(), None).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status != StatusCode::OK {
            return Err(self.resource_error(uri, Method::Get, status));
        }

        let headers = response.headers().clone();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.bytes().await?;

        let is_turtle = content_type
            .as_deref()
            .and_then(|ct| ct.parse::<mime::Mime>().ok())
            .map(|m| m.essence_str() == RDF_MIME)
            .unwrap_or(false);

        let resource = if is_turtle {
            let text = std::str::from_utf8(&body)
                .map_err(|e| FcrepoError::RdfParse(format!("{uri}: {e}")))?;
            let graph = ResourceGraph::from_turtle(text, uri)?;
            let kind = classify(&graph, &self.registry);
            Resource::from_parts(uri, kind, graph, Some(body), content_type, headers)
        } else {
            Resource::from_parts(
                uri,
                ResourceKind::Binary,
                ResourceGraph::with_subject(uri)?,
                Some(body),
                content_type,
                headers,
            )
        };
        Ok(Some(resource))
    }

    /// Re-read a resource's current metadata graph from the server.
    ///
    /// Unlike `get`, absence here is an error: the flush protocol needs
    /// the resource to still exist.
    pub(crate) async fn refresh_graph(&self, uri: &str) -> FcrepoResult<ResourceGraph> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(RDF_MIME));
        let response = self.api(uri, Method::Get, headers, None).await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(self.resource_error(uri, Method::Get, status));
        }
        let text = response.text().await?;
        ResourceGraph::from_turtle(&text, uri)
    }

    /// Write a full metadata graph back to a resource.
    pub(crate) async fn put_graph(&self, uri: &str, graph: &ResourceGraph) -> FcrepoResult<()> {
        let body = graph.to_turtle()?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(RDF_MIME));
        let response = self
            .api(uri, Method::Put, headers, Some(body.into_bytes()))
            .await?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(self.resource_error(uri, Method::Put, status))
        }
    }

    // -- creation protocol --------------------------------------------------

    /// Create a container inside an existing one.
    ///
    /// With `path`, the target is `parent/path`: an existing resource there
    /// raises `Conflict` unless `force` obliterates it first, and the
    /// returned handle's URI is the constructed path. Without `path`, the
    /// server assigns the URI via POST (honoring `slug` at its discretion)
    /// and the handle's URI is exactly what the server reports.
    pub async fn add_container(
        &self,
        parent_uri: &str,
        graph: ResourceGraph,
        options: CreateOptions,
    ) -> FcrepoResult<Resource> {
        let mut graph = graph;
        let kind = classify(&graph, &self.registry);
        if let Some(rdf_type) = kind.declared_type() {
            graph.ensure_type(rdf_type);
        }
        let body = graph.to_turtle()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(RDF_MIME));

        let uri = if let Some(path) = &options.path {
            let target = path_concat(parent_uri, path);
            self.ensure_path(&target, options.force).await?;
            debug!(uri = %target, "creating container at deterministic path");
            let response = self
                .api(&target, Method::Put, headers, Some(body.into_bytes()))
                .await?;
            let status = response.status();
            if status != StatusCode::CREATED {
                return Err(self.resource_error(&target, Method::Put, status));
            }
            // PUT is idempotent by path: trust the constructed URI, not the echo
            target
        } else {
            if let Some(slug) = &options.slug {
                headers.insert(
                    SLUG,
                    HeaderValue::from_str(slug)
                        .map_err(|e| FcrepoError::Config(format!("invalid slug '{slug}': {e}")))?,
                );
            }
            debug!(parent = %parent_uri, slug = ?options.slug, "creating server-assigned container");
            let response = self
                .api(parent_uri, Method::Post, headers, Some(body.into_bytes()))
                .await?;
            let status = response.status();
            if status != StatusCode::CREATED {
                return Err(self.resource_error(parent_uri, Method::Post, status));
            }
            self.created_uri(parent_uri, response).await?
        };

        let subject = oxrdf::NamedNode::new(uri.as_str())
            .map_err(|e| FcrepoError::RdfParse(format!("assigned URI '{uri}': {e}")))?;
        graph.rebase(subject);
        Ok(Resource::created(uri, kind, graph))
    }

    /// Create an ACL container under a resource at a preset path.
    pub async fn add_acl(&self, parent_uri: &str, path: &str, force: bool) -> FcrepoResult<Acl> {
        let mut graph = ResourceGraph::new();
        graph.ensure_type(vocab::webac("Acl"));
        let resource = self
            .add_container(
                parent_uri,
                graph,
                CreateOptions {
                    path: Some(path.to_string()),
                    force,
                    ..Default::default()
                },
            )
            .await?;
        Ok(Acl::from_resource(resource))
    }

    /// The URI a creation response assigned, from `Location` or the body.
    pub(crate) async fn created_uri(
        &self,
        request_uri: &str,
        response: reqwest::Response,
    ) -> FcrepoResult<String> {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        if let Some(uri) = location {
            return Ok(uri);
        }
        let body = response.text().await?;
        if body.trim().is_empty() {
            Err(FcrepoError::Resource {
                uri: request_uri.to_string(),
                user: self.current.clone(),
                method: Method::Post.as_str(),
                status: StatusCode::CREATED.as_u16(),
                reason: "created response carried no assigned URI".to_string(),
            })
        } else {
            Ok(body.trim().to_string())
        }
    }

    /// Check that a deterministic path is free, clearing it when forced.
    ///
    /// A 404 is the good case here. An existing resource is deleted and
    /// its tombstone obliterated when `force` is set; otherwise creation
    /// stops with a `Conflict`.
    pub(crate) async fn ensure_path(&self, uri: &str, force: bool) -> FcrepoResult<()> {
        let response = self.api(uri, Method::Get, HeaderMap::new(), None).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(uri = %uri, "path is free");
            return Ok(());
        }
        if !status.is_success() {
            return Err(self.resource_error(uri, Method::Get, status));
        }
        if force {
            debug!(uri = %uri, "force: obliterating existing resource");
            self.delete(uri).await?;
            self.obliterate(uri).await?;
            Ok(())
        } else {
            Err(FcrepoError::Conflict(uri.to_string()))
        }
    }

    // -- deletion -----------------------------------------------------------

    /// Delete a resource, leaving its tombstone behind.
    pub async fn delete(&self, uri: &str) -> FcrepoResult<()> {
        self.delete_uri(uri).await
    }

    /// Remove the tombstone a deleted resource left at its path.
    pub async fn obliterate(&self, uri: &str) -> FcrepoResult<()> {
        self.delete_uri(&path_concat(uri, "fcr:tombstone")).await
    }

    async fn delete_uri(&self, uri: &str) -> FcrepoResult<()> {
        let response = self.api(uri, Method::Delete, HeaderMap::new(), None).await?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(self.resource_error(uri, Method::Delete, status))
        }
    }

    // -- access roles -------------------------------------------------------

    /// Read the role map at `{uri}/fcr:accessroles`.
    pub async fn access_roles(&self, uri: &str) -> FcrepoResult<HashMap<String, Vec<String>>> {
        let roles_uri = path_concat(uri, "fcr:accessroles");
        let response = self
            .api(&roles_uri, Method::Get, HeaderMap::new(), None)
            .await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(self.resource_error(&roles_uri, Method::Get, status));
        }
        Ok(response.json().await?)
    }

    /// Replace the role map at `{uri}/fcr:accessroles`.
    pub async fn set_access_roles(
        &self,
        uri: &str,
        roles: &HashMap<String, Vec<String>>,
    ) -> FcrepoResult<()> {
        let roles_uri = path_concat(uri, "fcr:accessroles");
        let body = serde_json::to_vec(roles)?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let response = self
            .api(&roles_uri, Method::Post, headers, Some(body))
            .await?;
        let status = response.status();
        if status == StatusCode::CREATED || status == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(self.resource_error(&roles_uri, Method::Post, status))
        }
    }

    // -- effective ACL ------------------------------------------------------

    /// Follow a resource's `Link: rel="acl"` header to its effective ACL.
    pub async fn effective_acl(&self, resource: &Resource) -> FcrepoResult<Option<Acl>> {
        let Some(link) = resource.acl_link() else {
            return Ok(None);
        };
        Ok(self.get(&link).await?.and_then(Resource::into_acl))
    }
}
