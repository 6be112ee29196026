//! Authenticated HTTP dispatch
//!
//! All wire traffic goes through [`Repository::api`]: it validates the
//! target URI against the repository base, rewrites it into the active
//! transaction's namespace when one is open, resolves direct or delegated
//! credentials, and optionally dumps outgoing RDF payloads for debugging.

use std::fmt;

use reqwest::header::{HeaderMap, HeaderName, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::repository::Repository;
use super::RDF_MIME;
use crate::config::{Credentials, ADMIN_USER};
use crate::error::{FcrepoError, FcrepoResult};

/// Header asserting the acting user under delegated authentication
pub const ON_BEHALF_OF: HeaderName = HeaderName::from_static("on-behalf-of");

/// Header carrying the client's preferred path segment for POST creation
pub const SLUG: HeaderName = HeaderName::from_static("slug");

/// HTTP methods the repository REST API accepts.
///
/// A closed enum: an unsupported method cannot be expressed, so misuse
/// fails at compile time instead of silently doing nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Post,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    /// The method name on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }

    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Head => reqwest::Method::HEAD,
            Method::Options => reqwest::Method::OPTIONS,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Repository {
    /// Generic API call with a method, target URI, headers and body.
    ///
    /// The URI is checked against the repository base on every call, so a
    /// URI belonging to another repository never reaches the network.
    pub(crate) async fn api(
        &self,
        uri: &str,
        method: Method,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> FcrepoResult<reqwest::Response> {
        let path = self.paths.uri_to_path(uri)?;

        let target = match self.active_transaction() {
            Some(tx) => self.transaction_scope(&tx, uri, &path),
            None => uri.to_string(),
        };

        let (auth, acting) = self.effective_auth()?;
        debug!(method = %method, uri = %target, user = %self.current_user(), "api call");

        if let Some(payload) = &body {
            self.dump_rdf(&target, &headers, payload).await;
        }

        let mut request = self
            .http
            .request(method.as_reqwest(), &target)
            .basic_auth(&auth.user, Some(&auth.password))
            .headers(headers);
        if let Some(agent) = acting {
            debug!(agent = %agent, "delegated authentication");
            request = request.header(ON_BEHALF_OF, agent);
        }
        if let Some(payload) = body {
            request = request.body(payload);
        }

        Ok(request.send().await?)
    }

    /// Rewrite a path into the active transaction's namespace.
    ///
    /// Transaction-control calls (`fcr:tx` anywhere in the path) and paths
    /// already scoped under the transaction stay as issued, so control
    /// URIs and server-returned transaction URIs never nest twice.
    fn transaction_scope(&self, tx_uri: &str, uri: &str, path: &str) -> String {
        if path.contains("fcr:tx") {
            return uri.to_string();
        }
        let tx_path = self.paths.uri_to_path(tx_uri).unwrap_or_default();
        if !tx_path.is_empty()
            && (path == tx_path || path.starts_with(&format!("{tx_path}/")))
        {
            return uri.to_string();
        }
        if path.is_empty() {
            tx_uri.to_string()
        } else {
            format!("{tx_uri}/{path}")
        }
    }

    /// Credentials to authenticate with, plus the acting user to assert
    /// via `On-Behalf-Of` when running delegated.
    fn effective_auth(&self) -> FcrepoResult<(&Credentials, Option<&str>)> {
        let current = self
            .config
            .users
            .get(self.current_user())
            .ok_or_else(|| FcrepoError::UnknownUser(self.current_user().to_string()))?;
        if self.config.delegated && self.current_user() != ADMIN_USER {
            let admin = self.config.users.get(ADMIN_USER).ok_or_else(|| {
                FcrepoError::Config(format!("delegated mode requires a '{ADMIN_USER}' identity"))
            })?;
            Ok((admin, Some(current.user.as_str())))
        } else {
            Ok((current, None))
        }
    }

    /// Persist an outgoing Turtle payload to the configured dump directory.
    ///
    /// Failures are logged, never fatal: dumping is a debugging aid.
    async fn dump_rdf(&self, uri: &str, headers: &HeaderMap, payload: &[u8]) {
        let Some(dir) = &self.config.rdfdump else {
            return;
        };
        let is_turtle = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with(RDF_MIME))
            .unwrap_or(false);
        if !is_turtle {
            return;
        }
        let file = dir.join(format!("{}.ttl", uri.replace('/', "_")));
        match tokio::fs::write(&file, payload).await {
            Ok(()) => debug!(file = %file.display(), "dumped RDF payload"),
            Err(err) => warn!(file = %file.display(), error = %err, "RDF dump failed"),
        }
    }

    /// Build the error for a non-success HTTP outcome, naming the actual
    /// request target.
    pub(crate) fn resource_error(
        &self,
        uri: &str,
        method: Method,
        status: StatusCode,
    ) -> FcrepoError {
        FcrepoError::Resource {
            uri: uri.to_string(),
            user: self.current_user().to_string(),
            method: method.as_str(),
            status: status.as_u16(),
            reason: status
                .canonical_reason()
                .unwrap_or("unrecognized status")
                .to_string(),
        }
    }
}
