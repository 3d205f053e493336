//! Resource factory
//!
//! Builds a proposed resource of a given kind from untyped properties. Only
//! mutable kinds can be proposed; everything else is read-only here and
//! fails fast with its kind named.

use super::error::ResourceError;
use super::kind::ResourceKind;
use super::model::Resource;
use super::secret::{Secret, SecretProps};
use serde_json::Value;

/// Build a locally-proposed resource from raw properties.
pub fn new_resource(
    kind: ResourceKind,
    region: &str,
    props: Value,
) -> Result<Box<dyn Resource>, ResourceError> {
    match kind {
        ResourceKind::Secret => {
            let props: SecretProps =
                serde_json::from_value(props).map_err(|e| ResourceError::InvalidProperties {
                    kind,
                    message: e.to_string(),
                })?;
            Ok(Box::new(Secret::proposed(region, props)))
        }
        other => Err(ResourceError::UnsupportedKind(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_a_proposed_secret() {
        let resource = new_resource(
            ResourceKind::Secret,
            "us-east-2",
            json!({ "name": "db-password", "value": "hunter2" }),
        )
        .unwrap();

        assert_eq!(resource.kind(), ResourceKind::Secret);
        assert!(!resource.exists());
        assert_eq!(resource.name().as_deref(), Some("db-password"));
    }

    #[test]
    fn unknown_property_keys_are_rejected() {
        let err = new_resource(
            ResourceKind::Secret,
            "us-east-2",
            json!({ "name": "x", "value": "y", "colour": "red" }),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            ResourceError::InvalidProperties { kind: ResourceKind::Secret, .. }
        ));
    }

    #[test]
    fn boxed_resources_are_debuggable() {
        let resource = new_resource(
            ResourceKind::Secret,
            "us-east-2",
            json!({ "name": "db-password", "value": "hunter2" }),
        )
        .unwrap();
        let rendered = format!("{resource:?}");
        assert!(rendered.contains("Secret"));
    }

    #[test]
    fn read_only_kinds_cannot_be_proposed() {
        let err = new_resource(ResourceKind::Vpc, "us-east-2", json!({})).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("don't know how to make a {}", ResourceKind::Vpc)
        );
    }
}
