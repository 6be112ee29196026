//! Fcrepo SDK — Client library for Fedora Commons 4 style repositories
//!
//! An async client for LDP-style content stores: fetch, create, update
//! and delete hierarchical container and binary resources addressed by
//! URI, stage and flush RDF metadata edits, compose WebAC access control
//! out of ordinary resources, and scope groups of writes inside a
//! server-side transaction.
//!
//! # Architecture
//!
//! - `config` — YAML connection configuration (base URI, identities,
//!   delegated auth, RDF dump directory)
//! - `rdf` — per-resource Turtle graphs, staged [`RdfChange`] edits
//! - `repo` — the [`Repository`] connection: path translation,
//!   authenticated transport, fetch and the creation protocol
//! - `resource` — typed [`Resource`] handles, the [`TypeRegistry`],
//!   WebAC [`Acl`]/[`Authorization`] views, binary upload
//! - `transaction` — commit/rollback scopes rewriting paths into the
//!   server's transaction namespace
//!
//! # Quick Start
//!
//! ```no_run
//! use std::collections::HashMap;
//! use fcrepo_sdk::{dc_graph, CreateOptions, Repository, RepositoryConfig};
//!
//! # async fn demo() -> fcrepo_sdk::FcrepoResult<()> {
//! let config = RepositoryConfig::from_yaml_file("config.yml")?;
//! let repo = Repository::connect(config, "fedoraAdmin")?;
//!
//! // create a container with Dublin Core metadata
//! let metadata = dc_graph(&HashMap::from([
//!     ("title".to_string(), "My collection".to_string()),
//! ]));
//! let root = repo.path_to_uri("/");
//! let collection = repo
//!     .add_container(&root, metadata, CreateOptions {
//!         slug: Some("collection".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("created {}", collection.uri());
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod rdf;
pub mod repo;
pub mod resource;
pub mod transaction;

// Re-export main types for convenience
pub use config::{Credentials, RepositoryConfig, ADMIN_USER};
pub use error::{FcrepoError, FcrepoResult};
pub use rdf::{apply_changes, build_graph, dc_graph, vocab, RdfChange, ResourceGraph};
pub use repo::{path_concat, CreateOptions, Method, Repository, RDF_MIME};
pub use resource::{
    classify, guess_mime, AccessMode, Acl, AclMap, Authorization, BinaryOptions, BinarySource,
    Resource, ResourceKind, TypeRegistry, DEFAULT_MIME,
};
pub use transaction::Transaction;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
