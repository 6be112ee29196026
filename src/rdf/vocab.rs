//! Vocabulary namespaces used by the repository protocol
//!
//! IRIs for the handful of vocabularies the client reads and writes: LDP
//! containment, the Fedora repository namespace, WebAC access control and
//! Dublin Core descriptive metadata.

use oxrdf::NamedNode;

/// LDP namespace
pub const LDP_NS: &str = "http://www.w3.org/ns/ldp#";

/// Fedora Commons 4 repository namespace
pub const FEDORA_NS: &str = "http://fedora.info/definitions/v4/repository#";

/// WebAC access control namespace
pub const WEBAC_NS: &str = "http://www.w3.org/ns/auth/acl#";

/// Dublin Core elements namespace
pub const DC_NS: &str = "http://purl.org/dc/elements/1.1/";

/// The Dublin Core element set
pub const DC_FIELDS: [&str; 15] = [
    "contributor",
    "coverage",
    "creator",
    "date",
    "description",
    "format",
    "identifier",
    "language",
    "publisher",
    "relation",
    "rights",
    "source",
    "subject",
    "title",
    "type",
];

/// `rdf:type`
pub fn rdf_type() -> NamedNode {
    oxrdf::vocab::rdf::TYPE.into_owned()
}

/// `ldp:contains` — the containment predicate linking parents to children
pub fn ldp_contains() -> NamedNode {
    ldp("contains")
}

/// A term in the LDP namespace
pub fn ldp(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{LDP_NS}{local}"))
}

/// A term in the Fedora repository namespace
pub fn fedora(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{FEDORA_NS}{local}"))
}

/// A term in the WebAC namespace
pub fn webac(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{WEBAC_NS}{local}"))
}

/// A Dublin Core element
pub fn dc(local: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{DC_NS}{local}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        assert_eq!(rdf_type().as_str(), "http://www.w3.org/1999/02/22-rdf-syntax-ns#type");
        assert_eq!(ldp_contains().as_str(), "http://www.w3.org/ns/ldp#contains");
        assert_eq!(webac("Acl").as_str(), "http://www.w3.org/ns/auth/acl#Acl");
        assert_eq!(dc("title").as_str(), "http://purl.org/dc/elements/1.1/title");
        assert_eq!(
            fedora("lastModified").as_str(),
            "http://fedora.info/definitions/v4/repository#lastModified"
        );
    }

    #[test]
    fn test_dc_fields() {
        assert_eq!(DC_FIELDS.len(), 15);
        assert!(DC_FIELDS.contains(&"title"));
    }
}
