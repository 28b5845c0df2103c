//! # Document Validation
//!
//! Structural validation of a document against a normalized
//! [`SchemaNode`] tree: required-property presence, type conformance,
//! and enum membership.
//!
//! Validation is advisory. A failing document is reported to the caller
//! and never corrected; callers decide whether to persist it anyway.
//!
//! Wildcard objects do not require their synthetic `default` key: any
//! set of keys matching the pattern is acceptable, and every such key is
//! checked against the wildcard child.

use geometa_core::ValidationError;
use serde_json::Value;

use crate::node::{ArrayNode, Definition, ObjectNode, PrimitiveType, ScalarNode, SchemaNode};

/// Validate `document` against `node`, returning the first violation.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found in document order.
pub fn validate(document: &Value, node: &SchemaNode) -> Result<(), ValidationError> {
    match validate_all(document, node).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Validate `document` against `node`, collecting every violation.
pub fn validate_all(document: &Value, node: &SchemaNode) -> Vec<ValidationError> {
    let mut walker = Walker { errors: Vec::new() };
    walker.check(document, node, "");
    walker.errors
}

struct Walker {
    errors: Vec<ValidationError>,
}

impl Walker {
    fn fail(&mut self, path: &str, message: String) {
        self.errors.push(ValidationError::new(path, message));
    }

    fn check(&mut self, value: &Value, node: &SchemaNode, path: &str) {
        match node {
            SchemaNode::Object(obj) => self.check_object(value, obj, path),
            SchemaNode::Array(arr) => self.check_array(value, arr, path),
            SchemaNode::Scalar(scalar) => self.check_scalar(value, scalar, path),
            SchemaNode::Reference(definition) => self.check_reference(value, definition, path),
        }
    }

    fn check_object(&mut self, value: &Value, obj: &ObjectNode, path: &str) {
        let Some(map) = value.as_object() else {
            self.fail(path, format!("expected object, got {}", type_name(value)));
            return;
        };

        if !obj.is_wildcard() {
            for name in &obj.required {
                if !map.contains_key(name) {
                    self.fail(path, format!("'{name}' is a required property"));
                }
            }
        }

        if !obj.alternatives.is_empty() && !obj.alternatives.keys().any(|k| map.contains_key(k)) {
            let names: Vec<&str> = obj.alternatives.keys().map(String::as_str).collect();
            self.fail(path, format!("expected at least one of {names:?}"));
        }

        for (key, child_value) in map {
            if let Some(child) = obj.child(key) {
                self.check(child_value, child, &pointer(path, key));
            }
        }
    }

    fn check_array(&mut self, value: &Value, arr: &ArrayNode, path: &str) {
        let Some(items) = value.as_array() else {
            self.fail(path, format!("expected array, got {}", type_name(value)));
            return;
        };
        for (i, item) in items.iter().enumerate() {
            let item_path = format!("{path}/{i}");
            match arr {
                ArrayNode::Items(node) => self.check(item, node, &item_path),
                ArrayNode::Inline(obj) => self.check_object(item, obj, &item_path),
                ArrayNode::Untyped => {}
            }
        }
    }

    fn check_scalar(&mut self, value: &Value, scalar: &ScalarNode, path: &str) {
        match scalar {
            ScalarNode::Enum(values) => {
                if !values.contains(value) {
                    self.fail(path, format!("{value} is not one of {}", Value::from(values.clone())));
                }
            }
            ScalarNode::Primitive(primitive) => {
                let ok = match primitive {
                    PrimitiveType::String => value.is_string(),
                    PrimitiveType::Integer => is_integer(value),
                    PrimitiveType::Number => value.is_number(),
                    PrimitiveType::Boolean => value.is_boolean(),
                    PrimitiveType::Unsupported(name) => {
                        self.fail(path, format!("schema declares unsupported type '{name}'"));
                        return;
                    }
                };
                if !ok {
                    self.fail(
                        path,
                        format!("expected {}, got {}", primitive_name(primitive), type_name(value)),
                    );
                }
            }
        }
    }

    fn check_reference(&mut self, value: &Value, definition: &Definition, path: &str) {
        let (ok, expected) = match definition {
            Definition::DateOrDatetimeString => (value.is_string(), "date or datetime string"),
            Definition::I18nString => (
                value.is_string() || value.is_object(),
                "string or localized string mapping",
            ),
            Definition::I18nArray => (
                value.is_array() || value.is_object(),
                "list or localized list mapping",
            ),
            Definition::AnyType => (true, "any"),
            Definition::Other(reference) => {
                self.fail(path, format!("schema reference '{reference}' cannot be resolved"));
                return;
            }
        };
        if !ok {
            self.fail(path, format!("expected {expected}, got {}", type_name(value)));
        }
    }
}

fn is_integer(value: &Value) -> bool {
    value.is_i64()
        || value.is_u64()
        || value.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

fn primitive_name(primitive: &PrimitiveType) -> &str {
    match primitive {
        PrimitiveType::String => "string",
        PrimitiveType::Integer => "integer",
        PrimitiveType::Number => "number",
        PrimitiveType::Boolean => "boolean",
        PrimitiveType::Unsupported(name) => name,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Append `key` to a JSON Pointer, escaping `~` and `/`.
fn pointer(path: &str, key: &str) -> String {
    format!("{path}/{}", key.replace('~', "~0").replace('/', "~1"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::parse;
    use crate::template::synthesize;
    use serde_json::json;

    fn schema() -> SchemaNode {
        parse(&json!({
            "type": "object",
            "properties": {
                "title": {"$ref": "#/definitions/i18n_string"},
                "edition": {"type": "string"},
                "count": {"type": "integer"},
                "kind": {"type": "string", "enum": ["theme", "place"]},
                "contact": {
                    "type": "object",
                    "patternProperties": {
                        "^.*": {
                            "type": "object",
                            "properties": {"postalcode": {"type": "string"}},
                            "required": ["postalcode"]
                        }
                    }
                },
                "dates": {
                    "type": "object",
                    "properties": {"anyOf": {"creation": {"type": "string"}}}
                }
            },
            "required": ["title", "edition", "contact"]
        }))
        .unwrap()
    }

    #[test]
    fn synthesized_template_is_valid() {
        let node = schema();
        let doc = synthesize(&node).unwrap();
        assert_eq!(validate(&doc, &node), Ok(()));
    }

    #[test]
    fn missing_required_property() {
        let err = validate(&json!({"title": "", "contact": {}}), &schema()).unwrap_err();
        assert_eq!(err.path, "");
        assert!(err.message.contains("'edition'"));
    }

    #[test]
    fn wrong_primitive_type() {
        let doc = json!({"title": "", "edition": 3.14, "contact": {}});
        let err = validate(&doc, &schema()).unwrap_err();
        assert_eq!(err.path, "/edition");
        assert_eq!(err.message, "expected string, got number");
    }

    #[test]
    fn enum_membership() {
        let doc = json!({"title": "", "edition": "", "contact": {}, "kind": "nope"});
        let err = validate(&doc, &schema()).unwrap_err();
        assert_eq!(err.path, "/kind");
    }

    #[test]
    fn wildcard_children_checked_under_any_key() {
        let doc = json!({
            "title": "",
            "edition": "",
            "contact": {"first": {"postalcode": 55555}}
        });
        let err = validate(&doc, &schema()).unwrap_err();
        assert_eq!(err.path, "/contact/first/postalcode");
    }

    #[test]
    fn wildcard_object_does_not_require_default_key() {
        let doc = json!({"title": "", "edition": "", "contact": {"first": {"postalcode": "01234"}}});
        assert!(validate(&doc, &schema()).is_ok());
    }

    #[test]
    fn disjunction_requires_one_alternative() {
        let doc = json!({"title": "", "edition": "", "contact": {}, "dates": {}});
        let err = validate(&doc, &schema()).unwrap_err();
        assert_eq!(err.path, "/dates");
    }

    #[test]
    fn localized_title_mapping_is_accepted() {
        let doc = json!({"title": {"en": "Title", "fr": "Titre"}, "edition": "", "contact": {}});
        assert!(validate(&doc, &schema()).is_ok());
    }

    #[test]
    fn integral_float_is_an_integer() {
        let doc = json!({"title": "", "edition": "", "contact": {}, "count": 2.0});
        assert!(validate(&doc, &schema()).is_ok());
    }

    #[test]
    fn validate_all_collects_every_violation() {
        let doc = json!({"title": 1, "edition": 2, "contact": []});
        let errors = validate_all(&doc, &schema());
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn pointer_escapes_reserved_characters() {
        assert_eq!(pointer("/a", "b/c~d"), "/a/b~1c~0d");
    }
}
