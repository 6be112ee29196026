//! Shared helpers for the integration tests
//!
//! Every test talks to a wiremock server standing in for the Fedora REST
//! API; these helpers build a connected `Repository` against it and the
//! Turtle bodies the mock endpoints serve.

// each test binary uses a different subset of these helpers
#![allow(dead_code)]

use fcrepo_sdk::{Repository, RepositoryConfig};

pub const DC_TITLE: &str = "http://purl.org/dc/elements/1.1/title";
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const LDP_CONTAINS: &str = "http://www.w3.org/ns/ldp#contains";
pub const WEBAC: &str = "http://www.w3.org/ns/auth/acl#";

pub fn config_yaml(base: &str, extra: &str) -> String {
    format!(
        "uri: {base}\n\
         users:\n  \
           fedoraAdmin: {{user: fedoraAdmin, password: secret1}}\n  \
           alice: {{user: alice, password: secret2}}\n  \
           bob: {{user: bob, password: secret3}}\n\
         {extra}"
    )
}

pub fn repo_for(base: &str) -> Repository {
    let config = RepositoryConfig::from_yaml_str(&config_yaml(base, "")).unwrap();
    Repository::connect(config, "fedoraAdmin").unwrap()
}

/// A Turtle document giving `subject` a dc:title.
pub fn titled_turtle(subject: &str, title: &str) -> String {
    format!("<{subject}> <{DC_TITLE}> \"{title}\" .\n")
}

/// A Turtle document typing `subject` as a WebAC ACL, containing `children`.
pub fn acl_turtle(subject: &str, children: &[&str]) -> String {
    let mut doc = format!("<{subject}> <{RDF_TYPE}> <{WEBAC}Acl> .\n");
    for child in children {
        doc.push_str(&format!("<{subject}> <{LDP_CONTAINS}> <{child}> .\n"));
    }
    doc
}

/// A Turtle document encoding one WebAC authorization.
pub fn authorization_turtle(subject: &str, agent: &str, mode: &str, target: &str) -> String {
    format!(
        "<{subject}> <{RDF_TYPE}> <{WEBAC}Authorization> .\n\
         <{subject}> <{WEBAC}accessTo> <{target}> .\n\
         <{subject}> <{WEBAC}mode> <{WEBAC}{mode}> .\n\
         <{subject}> <{WEBAC}agent> \"{agent}\" .\n"
    )
}
