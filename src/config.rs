//! Repository configuration
//!
//! A repository connection is described by a small YAML document: the base
//! URI, a map of named user identities to credentials, and optional flags
//! for delegated authentication and RDF payload dumping.
//!
//! ```yaml
//! uri: http://localhost:8080/
//! users:
//!   fedoraAdmin: {user: fedoraAdmin, password: secret1}
//!   alice:       {user: alice,       password: secret2}
//! delegated: true
//! rdfdump: /tmp/rdf-dumps
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{FcrepoError, FcrepoResult};

/// The administrative identity used for delegated authentication.
pub const ADMIN_USER: &str = "fedoraAdmin";

/// Credentials for one named identity
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    /// Login name sent as HTTP basic auth
    pub user: String,
    /// Password sent as HTTP basic auth
    pub password: String,
}

/// Repository connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryConfig {
    /// Base URI of the repository (the REST root lives at `{uri}rest/`)
    pub uri: String,
    /// Named identities available to `set_user`
    pub users: HashMap<String, Credentials>,
    /// Authenticate as `fedoraAdmin` and assert the acting user via header
    #[serde(default)]
    pub delegated: bool,
    /// Directory to dump outgoing RDF payloads into, for debugging
    #[serde(default)]
    pub rdfdump: Option<PathBuf>,
}

impl RepositoryConfig {
    /// Parse a configuration from a YAML string and validate it.
    pub fn from_yaml_str(text: &str) -> FcrepoResult<Self> {
        let config: Self = serde_yaml::from_str(text)
            .map_err(|e| FcrepoError::Config(format!("YAML parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> FcrepoResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            FcrepoError::Config(format!("cannot read config {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&text)
    }

    /// Check the invariants a connection relies on.
    pub fn validate(&self) -> FcrepoResult<()> {
        if !self.uri.starts_with("http://") && !self.uri.starts_with("https://") {
            return Err(FcrepoError::Config(format!(
                "repository uri must be http(s), got '{}'",
                self.uri
            )));
        }
        if self.users.is_empty() {
            return Err(FcrepoError::Config("no users configured".to_string()));
        }
        if self.delegated && !self.users.contains_key(ADMIN_USER) {
            return Err(FcrepoError::Config(format!(
                "delegated mode requires a '{ADMIN_USER}' identity"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = r#"
uri: http://localhost:8080/
users:
  fedoraAdmin: {user: fedoraAdmin, password: secret1}
  alice: {user: alice, password: secret2}
"#;

    #[test]
    fn test_parse_minimal() {
        let config = RepositoryConfig::from_yaml_str(GOOD).unwrap();
        assert_eq!(config.uri, "http://localhost:8080/");
        assert_eq!(config.users.len(), 2);
        assert!(!config.delegated);
        assert!(config.rdfdump.is_none());
    }

    #[test]
    fn test_optional_fields() {
        let text = format!("{GOOD}delegated: true\nrdfdump: /tmp/dumps\n");
        let config = RepositoryConfig::from_yaml_str(&text).unwrap();
        assert!(config.delegated);
        assert_eq!(config.rdfdump, Some(PathBuf::from("/tmp/dumps")));
    }

    #[test]
    fn test_missing_users_rejected() {
        let err = RepositoryConfig::from_yaml_str("uri: http://localhost:8080/\n").unwrap_err();
        assert!(matches!(err, FcrepoError::Config(_)));
    }

    #[test]
    fn test_non_http_uri_rejected() {
        let text = GOOD.replace("http://localhost:8080/", "ftp://localhost/");
        let err = RepositoryConfig::from_yaml_str(&text).unwrap_err();
        assert!(matches!(err, FcrepoError::Config(_)));
    }

    #[test]
    fn test_delegated_requires_admin() {
        let text = r#"
uri: http://localhost:8080/
users:
  alice: {user: alice, password: secret2}
delegated: true
"#;
        let err = RepositoryConfig::from_yaml_str(text).unwrap_err();
        assert!(matches!(err, FcrepoError::Config(_)));
    }
}
