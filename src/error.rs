//! Error types for the Fedora repository SDK

use thiserror::Error;

/// Errors that can occur when talking to a Fedora repository
#[derive(Error, Debug)]
pub enum FcrepoError {
    /// Required configuration fields missing or malformed
    #[error("configuration error: {0}")]
    Config(String),

    /// A URI does not belong to the configured repository
    #[error("URI {uri} is not inside repository {base}")]
    Uri { uri: String, base: String },

    /// Deterministic-path creation found an existing resource
    #[error("path {0} already exists: re-creating it requires force")]
    Conflict(String),

    /// Non-success HTTP outcome during a resource operation
    #[error("{method} {uri} as {user} returned HTTP {status} {reason}")]
    Resource {
        uri: String,
        user: String,
        method: &'static str,
        status: u16,
        reason: String,
    },

    /// Failure inside transaction start/commit/rollback/keep-alive
    #[error("transaction {op} at {uri} failed: {reason}")]
    Transaction {
        uri: String,
        op: &'static str,
        status: Option<u16>,
        reason: String,
    },

    /// Flush called with an empty change queue
    #[error("no staged changes to flush for {0}")]
    NothingToFlush(String),

    /// User name not present in the repository configuration
    #[error("unknown user '{0}' in repository config")]
    UnknownUser(String),

    /// A relation triple between incompatible resource kinds
    #[error("relation {relation} is not allowed from {subject} to {object}")]
    Relation {
        relation: String,
        subject: &'static str,
        object: &'static str,
    },

    /// RDF parse error
    #[error("RDF parse error: {0}")]
    RdfParse(String),

    /// RDF serialization error
    #[error("RDF serialize error: {0}")]
    RdfSerialize(String),

    /// HTTP transport error
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FcrepoResult<T> = Result<T, FcrepoError>;
