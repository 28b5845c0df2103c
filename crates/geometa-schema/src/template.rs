//! # Template Synthesis
//!
//! Builds the minimal document that satisfies every required property of
//! a schema. Optional properties are left out entirely; the result is
//! the skeleton a person fills in, and the baseline used whenever no
//! usable sidecar exists yet.

use geometa_core::SchemaDefinitionError;
use serde_json::{Map, Value};

use crate::defaults::resolve_at;
use crate::node::{ArrayNode, ObjectNode, SchemaNode};

/// Synthesize the minimal document for `node`.
///
/// - Objects contain each required property, plus every disjunction
///   alternative as a sibling key.
/// - Arrays contain exactly one synthesized element; untyped arrays are
///   empty.
/// - Leaves take their canonical default.
///
/// # Errors
///
/// Only a leaf without a canonical default fails, with
/// [`SchemaDefinitionError`].
pub fn synthesize(node: &SchemaNode) -> Result<Value, SchemaDefinitionError> {
    synthesize_at(node, "")
}

fn synthesize_at(node: &SchemaNode, path: &str) -> Result<Value, SchemaDefinitionError> {
    match node {
        SchemaNode::Object(obj) => synthesize_object(obj, path),
        SchemaNode::Array(ArrayNode::Items(item)) => {
            let element = synthesize_at(item, &format!("{path}/items"))?;
            Ok(Value::Array(vec![element]))
        }
        SchemaNode::Array(ArrayNode::Inline(obj)) => {
            let element = synthesize_object(obj, path)?;
            Ok(Value::Array(vec![element]))
        }
        SchemaNode::Array(ArrayNode::Untyped) => Ok(Value::Array(Vec::new())),
        SchemaNode::Scalar(_) | SchemaNode::Reference(_) => resolve_at(node, path),
    }
}

fn synthesize_object(obj: &ObjectNode, path: &str) -> Result<Value, SchemaDefinitionError> {
    let mut map = Map::new();
    for (name, child) in obj.required_children() {
        let value = synthesize_at(child, &format!("{path}/properties/{name}"))?;
        map.insert(name.to_string(), value);
    }
    for (name, alt) in &obj.alternatives {
        let value = synthesize_at(alt, &format!("{path}/properties/anyOf/{name}"))?;
        map.insert(name.clone(), value);
    }
    Ok(Value::Object(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::parse;
    use serde_json::json;

    fn template(raw: Value) -> Value {
        synthesize(&parse(&raw).unwrap()).unwrap()
    }

    #[test]
    fn single_required_string() {
        let t = template(json!({
            "type": "object",
            "properties": {"a": {"type": "string"}},
            "required": ["a"]
        }));
        assert_eq!(t, json!({"a": ""}));
    }

    #[test]
    fn optional_properties_are_omitted() {
        let t = template(json!({
            "type": "object",
            "properties": {"a": {"type": "string"}, "b": {"type": "integer"}},
            "required": ["b"]
        }));
        assert_eq!(t, json!({"b": 0}));
    }

    #[test]
    fn wildcard_object_uses_default_key() {
        let t = template(json!({
            "type": "object",
            "properties": {
                "keywords": {
                    "type": "object",
                    "patternProperties": {
                        "^.*": {
                            "type": "object",
                            "properties": {"keywords": {"$ref": "#/definitions/i18n_array"}},
                            "required": ["keywords"]
                        }
                    }
                }
            },
            "required": ["keywords"]
        }));
        assert_eq!(t, json!({"keywords": {"default": {"keywords": []}}}));
    }

    #[test]
    fn disjunction_members_are_siblings() {
        let t = template(json!({
            "type": "object",
            "properties": {
                "dates": {
                    "type": "object",
                    "properties": {
                        "anyOf": {
                            "creation": {"type": "string"},
                            "publication": {"type": "string"}
                        }
                    }
                }
            },
            "required": ["dates"]
        }));
        assert_eq!(t, json!({"dates": {"creation": "", "publication": ""}}));
    }

    #[test]
    fn normal_array_has_one_element() {
        let t = template(json!({"type": "array", "items": {"type": "string", "enum": ["x", "y"]}}));
        assert_eq!(t, json!(["x"]));
    }

    #[test]
    fn inline_array_has_one_object_element() {
        let t = template(json!({
            "type": "array",
            "properties": {
                "bbox": {"type": "array", "items": {"type": "number"}},
                "crs": {"type": "integer"},
                "description": {"type": "string"}
            },
            "required": ["bbox", "crs"]
        }));
        assert_eq!(t, json!([{"bbox": [0.0], "crs": 0}]));
    }

    #[test]
    fn untyped_array_is_empty() {
        assert_eq!(template(json!({"type": "array"})), json!([]));
    }

    #[test]
    fn error_path_names_the_failing_leaf() {
        let node = parse(&json!({
            "type": "object",
            "properties": {"contact": {"$ref": "#/definitions/contact"}},
            "required": ["contact"]
        }))
        .unwrap();
        let err = synthesize(&node).unwrap_err();
        assert_eq!(
            err,
            SchemaDefinitionError::UnknownReference {
                path: "/properties/contact".to_string(),
                reference: "#/definitions/contact".to_string(),
            }
        );
    }

    #[test]
    fn optional_broken_leaf_does_not_fail() {
        let node = parse(&json!({
            "type": "object",
            "properties": {
                "a": {"type": "string"},
                "b": {"$ref": "#/definitions/unknown"}
            },
            "required": ["a"]
        }))
        .unwrap();
        assert_eq!(synthesize(&node).unwrap(), json!({"a": ""}));
    }
}
