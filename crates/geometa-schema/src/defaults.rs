//! # Canonical Defaults
//!
//! Every leaf of a normalized schema resolves to exactly one canonical
//! zero-value. Enumerations resolve to their first declared literal so
//! that repeated synthesis is deterministic.

use geometa_core::SchemaDefinitionError;
use serde_json::{json, Value};

use crate::node::{Definition, PrimitiveType, ScalarNode, SchemaNode};

/// Canonical default for a scalar or reference leaf.
///
/// # Errors
///
/// Returns [`SchemaDefinitionError`] for unsupported primitive types,
/// unrecognized references, or a node that is not a leaf.
pub fn resolve_default(leaf: &SchemaNode) -> Result<Value, SchemaDefinitionError> {
    resolve_at(leaf, "")
}

pub(crate) fn resolve_at(leaf: &SchemaNode, path: &str) -> Result<Value, SchemaDefinitionError> {
    match leaf {
        SchemaNode::Scalar(ScalarNode::Enum(values)) => {
            values
                .first()
                .cloned()
                .ok_or_else(|| SchemaDefinitionError::Malformed {
                    path: path.to_string(),
                    reason: "enum has no values".to_string(),
                })
        }
        SchemaNode::Scalar(ScalarNode::Primitive(primitive)) => match primitive {
            PrimitiveType::String => Ok(json!("")),
            PrimitiveType::Integer => Ok(json!(0)),
            PrimitiveType::Number => Ok(json!(0.0)),
            PrimitiveType::Boolean => Ok(json!(false)),
            PrimitiveType::Unsupported(name) => Err(SchemaDefinitionError::UnknownType {
                path: path.to_string(),
                type_name: name.clone(),
            }),
        },
        SchemaNode::Reference(definition) => match definition {
            Definition::DateOrDatetimeString | Definition::I18nString | Definition::AnyType => {
                Ok(json!(""))
            }
            Definition::I18nArray => Ok(json!([])),
            Definition::Other(reference) => Err(SchemaDefinitionError::UnknownReference {
                path: path.to_string(),
                reference: reference.clone(),
            }),
        },
        SchemaNode::Object(_) | SchemaNode::Array(_) => Err(SchemaDefinitionError::Malformed {
            path: path.to_string(),
            reason: "only scalar and reference nodes have canonical defaults".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::parse;

    fn leaf(raw: Value) -> SchemaNode {
        parse(&raw).unwrap()
    }

    #[test]
    fn primitive_defaults() {
        assert_eq!(resolve_default(&leaf(json!({"type": "string"}))).unwrap(), json!(""));
        assert_eq!(resolve_default(&leaf(json!({"type": "integer"}))).unwrap(), json!(0));
        assert_eq!(resolve_default(&leaf(json!({"type": "number"}))).unwrap(), json!(0.0));
        assert_eq!(resolve_default(&leaf(json!({"type": "boolean"}))).unwrap(), json!(false));
    }

    #[test]
    fn reference_defaults() {
        let r = |name: &str| leaf(json!({"$ref": format!("#/definitions/{name}")}));
        assert_eq!(resolve_default(&r("date_or_datetime_string")).unwrap(), json!(""));
        assert_eq!(resolve_default(&r("i18n_string")).unwrap(), json!(""));
        assert_eq!(resolve_default(&r("i18n_array")).unwrap(), json!([]));
        assert_eq!(resolve_default(&r("any_type")).unwrap(), json!(""));
    }

    #[test]
    fn enum_resolves_to_first_value_every_time() {
        let node = leaf(json!({"type": "string", "enum": ["theme", "place", "stratum"]}));
        for _ in 0..10 {
            assert_eq!(resolve_default(&node).unwrap(), json!("theme"));
        }
    }

    #[test]
    fn enum_wins_over_type() {
        let node = leaf(json!({"type": "integer", "enum": [3, 5]}));
        assert_eq!(resolve_default(&node).unwrap(), json!(3));
    }

    #[test]
    fn unknown_reference_is_a_definition_error() {
        let err = resolve_default(&leaf(json!({"$ref": "#/definitions/contact"}))).unwrap_err();
        assert!(matches!(err, SchemaDefinitionError::UnknownReference { .. }));
    }

    #[test]
    fn unsupported_type_is_a_definition_error() {
        let err = resolve_default(&leaf(json!({"type": "null"}))).unwrap_err();
        assert!(matches!(
            err,
            SchemaDefinitionError::UnknownType { ref type_name, .. } if type_name == "null"
        ));
    }

    #[test]
    fn containers_have_no_leaf_default() {
        let node = leaf(json!({"type": "object", "properties": {}}));
        assert!(resolve_default(&node).is_err());
    }
}
