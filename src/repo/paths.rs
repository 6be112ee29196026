//! URI / REST path translation
//!
//! Every addressable resource lives under `{base}rest/`. The translator
//! maps between server-relative REST paths and absolute URIs, and rejects
//! URIs that do not belong to the configured repository before any network
//! I/O happens.

use regex::Regex;

use crate::error::{FcrepoError, FcrepoResult};

/// Pure mapping between absolute URIs and REST paths for one repository
#[derive(Debug, Clone)]
pub struct PathMap {
    base: String,
    matcher: Regex,
}

impl PathMap {
    /// Build a translator for a base URI (normalized to a trailing slash).
    pub fn new(base_uri: &str) -> FcrepoResult<Self> {
        let mut base = base_uri.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let pattern = format!("^{}rest(?:/(.*))?$", regex::escape(&base));
        let matcher = Regex::new(&pattern)
            .map_err(|e| FcrepoError::Config(format!("bad base URI '{base}': {e}")))?;
        Ok(Self { base, matcher })
    }

    /// The normalized base URI, with trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Convert a REST path to an absolute URI.
    pub fn path_to_uri(&self, path: &str) -> String {
        let root = format!("{}rest", self.base);
        if path.is_empty() {
            return root;
        }
        if path.starts_with('/') {
            format!("{root}{path}")
        } else {
            format!("{root}/{path}")
        }
    }

    /// Convert an absolute URI back to a REST path.
    ///
    /// Fails when the URI does not start with this repository's REST root.
    pub fn uri_to_path(&self, uri: &str) -> FcrepoResult<String> {
        match self.matcher.captures(uri) {
            Some(captures) => Ok(captures
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default()),
            None => Err(FcrepoError::Uri {
                uri: uri.to_string(),
                base: self.base.clone(),
            }),
        }
    }
}

/// Append a path segment or `fcr:` suffix to a URI.
pub fn path_concat(uri: &str, suffix: &str) -> String {
    format!("{}/{}", uri.trim_end_matches('/'), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> PathMap {
        PathMap::new("http://localhost:8080").unwrap()
    }

    #[test]
    fn test_path_to_uri() {
        let p = paths();
        assert_eq!(p.path_to_uri(""), "http://localhost:8080/rest");
        assert_eq!(p.path_to_uri("/"), "http://localhost:8080/rest/");
        assert_eq!(p.path_to_uri("a/b"), "http://localhost:8080/rest/a/b");
        assert_eq!(p.path_to_uri("/a/b"), "http://localhost:8080/rest/a/b");
    }

    #[test]
    fn test_uri_to_path() {
        let p = paths();
        assert_eq!(p.uri_to_path("http://localhost:8080/rest/a/b").unwrap(), "a/b");
        assert_eq!(p.uri_to_path("http://localhost:8080/rest").unwrap(), "");
        assert_eq!(p.uri_to_path("http://localhost:8080/rest/").unwrap(), "");
    }

    #[test]
    fn test_round_trip() {
        let p = paths();
        for path in ["a", "a/b/c", "a/fcr:tombstone"] {
            assert_eq!(p.uri_to_path(&p.path_to_uri(path)).unwrap(), path);
        }
        for uri in [
            "http://localhost:8080/rest/x",
            "http://localhost:8080/rest/x/y/z",
        ] {
            assert_eq!(p.path_to_uri(&p.uri_to_path(uri).unwrap()), uri);
        }
    }

    #[test]
    fn test_foreign_uri_rejected() {
        let p = paths();
        for uri in [
            "http://elsewhere:8080/rest/a",
            "http://localhost:8080/other/a",
            "not a uri",
        ] {
            assert!(matches!(
                p.uri_to_path(uri),
                Err(FcrepoError::Uri { .. })
            ));
        }
    }

    #[test]
    fn test_path_concat() {
        assert_eq!(path_concat("http://h/rest/a", "b"), "http://h/rest/a/b");
        assert_eq!(path_concat("http://h/rest/a/", "b"), "http://h/rest/a/b");
        assert_eq!(
            path_concat("http://h/rest/a", "fcr:tombstone"),
            "http://h/rest/a/fcr:tombstone"
        );
    }
}
