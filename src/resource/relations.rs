//! Relation compatibility table
//!
//! Some predicates only make sense between particular resource kinds: an
//! `accessControl` pointer must target an ACL, an `accessTo` triple must
//! hang off an authorization. The table below is consulted before such a
//! triple is staged; relations not listed are unconstrained.

use super::registry::ResourceKind;
use crate::error::{FcrepoError, FcrepoResult};

struct RelationRule {
    name: &'static str,
    subjects: &'static [ResourceKind],
    objects: &'static [ResourceKind],
}

const RULES: &[RelationRule] = &[
    RelationRule {
        name: "accessControl",
        subjects: &[ResourceKind::Container, ResourceKind::Binary],
        objects: &[ResourceKind::Acl],
    },
    RelationRule {
        name: "accessTo",
        subjects: &[ResourceKind::Authorization],
        objects: &[ResourceKind::Container, ResourceKind::Binary],
    },
];

/// Check that a relation between two resource kinds is permitted.
pub fn validate(relation: &str, subject: ResourceKind, object: ResourceKind) -> FcrepoResult<()> {
    for rule in RULES {
        if rule.name == relation {
            if !rule.subjects.contains(&subject) || !rule.objects.contains(&object) {
                return Err(FcrepoError::Relation {
                    relation: relation.to_string(),
                    subject: subject.tag(),
                    object: object.tag(),
                });
            }
            return Ok(());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_control_targets_acl() {
        assert!(validate("accessControl", ResourceKind::Container, ResourceKind::Acl).is_ok());
        assert!(validate("accessControl", ResourceKind::Binary, ResourceKind::Acl).is_ok());
    }

    #[test]
    fn test_access_control_rejects_non_acl_object() {
        let err =
            validate("accessControl", ResourceKind::Container, ResourceKind::Container).unwrap_err();
        assert!(matches!(err, FcrepoError::Relation { .. }));
    }

    #[test]
    fn test_access_to_hangs_off_authorization() {
        assert!(validate("accessTo", ResourceKind::Authorization, ResourceKind::Container).is_ok());
        let err = validate("accessTo", ResourceKind::Acl, ResourceKind::Container).unwrap_err();
        assert!(matches!(err, FcrepoError::Relation { .. }));
    }

    #[test]
    fn test_unlisted_relation_is_unconstrained() {
        assert!(validate("memberOf", ResourceKind::Binary, ResourceKind::Binary).is_ok());
    }
}
