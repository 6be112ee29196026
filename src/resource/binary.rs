//! Binary resource creation
//!
//! Binaries follow the same deterministic-vs-slugged creation split as
//! containers, but the payload is an opaque byte stream instead of RDF:
//! a local file, a URL the client streams from, or in-memory bytes. The
//! MIME type resolves in priority order: explicit option, then whatever
//! the source itself suggests (upstream Content-Type or filename
//! extension), then `application/octet-stream`.

use std::path::PathBuf;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::debug;

use super::handle::Resource;
use super::registry::ResourceKind;
use crate::error::{FcrepoError, FcrepoResult};
use crate::rdf::ResourceGraph;
use crate::repo::{path_concat, Method, Repository, SLUG};

/// Fallback MIME type for payloads nothing else describes
pub const DEFAULT_MIME: &str = "application/octet-stream";

/// Where a binary payload comes from
#[derive(Debug, Clone)]
pub enum BinarySource {
    /// A local file; basename and MIME type derive from the path
    File(PathBuf),
    /// An http(s) URL the client downloads; MIME type comes from upstream
    Url(String),
    /// In-memory bytes with an optional filename
    Bytes {
        data: Vec<u8>,
        filename: Option<String>,
    },
}

/// Options for binary creation
#[derive(Debug, Clone, Default)]
pub struct BinaryOptions {
    /// Advisory last path segment for server-assigned creation
    pub slug: Option<String>,
    /// Deterministic path relative to the parent
    pub path: Option<String>,
    /// Overwrite an existing resource at the deterministic path
    pub force: bool,
    /// Explicit MIME type, overriding anything source-derived
    pub mime: Option<String>,
}

struct ResolvedSource {
    data: Vec<u8>,
    basename: Option<String>,
    mime: Option<String>,
}

/// Guess a MIME type from a filename extension.
pub fn guess_mime(filename: &str) -> Option<&'static str> {
    let extension = filename.rsplit('.').next()?.to_ascii_lowercase();
    match extension.as_str() {
        "txt" => Some("text/plain"),
        "ttl" => Some("text/turtle"),
        "html" | "htm" => Some("text/html"),
        "csv" => Some("text/csv"),
        "json" => Some("application/json"),
        "xml" => Some("application/xml"),
        "pdf" => Some("application/pdf"),
        "zip" => Some("application/zip"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "tif" | "tiff" => Some("image/tiff"),
        "mp3" => Some("audio/mpeg"),
        "mp4" => Some("video/mp4"),
        _ => None,
    }
}

fn resolve_mime(explicit: Option<String>, derived: Option<String>) -> String {
    explicit
        .or(derived)
        .unwrap_or_else(|| DEFAULT_MIME.to_string())
}

impl Repository {
    /// Upload a binary payload into a container.
    ///
    /// The slug doubles as the attachment filename for URL and in-memory
    /// sources that have no natural basename of their own.
    pub async fn add_binary(
        &self,
        parent_uri: &str,
        source: BinarySource,
        options: BinaryOptions,
    ) -> FcrepoResult<Resource> {
        let resolved = self.resolve_source(source, options.slug.as_deref()).await?;
        let mime = resolve_mime(options.mime.clone(), resolved.mime);

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(&mime)
                .map_err(|e| FcrepoError::Config(format!("invalid MIME type '{mime}': {e}")))?,
        );
        if let Some(basename) = &resolved.basename {
            let disposition = format!("attachment; filename=\"{basename}\"");
            headers.insert(
                CONTENT_DISPOSITION,
                HeaderValue::from_str(&disposition).map_err(|e| {
                    FcrepoError::Config(format!("invalid filename '{basename}': {e}"))
                })?,
            );
        }

        let uri = if let Some(path) = &options.path {
            let target = path_concat(parent_uri, path);
            self.ensure_path(&target, options.force).await?;
            debug!(uri = %target, mime = %mime, "uploading binary to deterministic path");
            let response = self
                .api(&target, Method::Put, headers, Some(resolved.data))
                .await?;
            let status = response.status();
            if status != StatusCode::CREATED {
                return Err(self.resource_error(&target, Method::Put, status));
            }
            target
        } else {
            if let Some(slug) = &options.slug {
                headers.insert(
                    SLUG,
                    HeaderValue::from_str(slug)
                        .map_err(|e| FcrepoError::Config(format!("invalid slug '{slug}': {e}")))?,
                );
            }
            debug!(parent = %parent_uri, mime = %mime, slug = ?options.slug, "uploading server-assigned binary");
            let response = self
                .api(parent_uri, Method::Post, headers, Some(resolved.data))
                .await?;
            let status = response.status();
            if status != StatusCode::CREATED {
                return Err(self.resource_error(parent_uri, Method::Post, status));
            }
            self.created_uri(parent_uri, response).await?
        };

        Ok(Resource::created(
            uri.clone(),
            ResourceKind::Binary,
            ResourceGraph::with_subject(&uri)?,
        ))
    }

    async fn resolve_source(
        &self,
        source: BinarySource,
        slug: Option<&str>,
    ) -> FcrepoResult<ResolvedSource> {
        match source {
            BinarySource::File(path) => {
                let data = tokio::fs::read(&path).await?;
                let basename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string());
                let mime = basename
                    .as_deref()
                    .and_then(guess_mime)
                    .map(String::from);
                Ok(ResolvedSource {
                    data,
                    basename,
                    mime,
                })
            }
            BinarySource::Url(url) => {
                debug!(url = %url, "streaming binary source from URL");
                let response = self.http.get(&url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(self.resource_error(&url, Method::Get, status));
                }
                let mime = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(String::from);
                let basename = slug.map(String::from).or_else(|| {
                    url.split('?')
                        .next()
                        .and_then(|u| u.rsplit('/').next())
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                });
                let data = response.bytes().await?.to_vec();
                Ok(ResolvedSource {
                    data,
                    basename,
                    mime,
                })
            }
            BinarySource::Bytes { data, filename } => {
                let basename = filename.or_else(|| slug.map(String::from));
                let mime = basename
                    .as_deref()
                    .and_then(guess_mime)
                    .map(String::from);
                Ok(ResolvedSource {
                    data,
                    basename,
                    mime,
                })
            }
        }
    }
}
