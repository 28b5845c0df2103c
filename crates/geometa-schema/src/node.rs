//! # Schema Node Model
//!
//! Raw schema definitions found in practice are irregular. Three shapes
//! in particular do not follow plain JSON Schema object/array nesting:
//!
//! - **Wildcard-keyed objects.** `patternProperties` instead of
//!   `properties`: any key matching the pattern is allowed. Normalized to
//!   an [`ObjectNode`] with one synthetic required child keyed
//!   [`WILDCARD_PLACEHOLDER`] and the pattern kept for validation.
//! - **Disjunction markers.** `properties: { anyOf: { a: ..., b: ... } }`.
//!   The members become [`ObjectNode::alternatives`], each synthesized as
//!   a sibling key.
//! - **Arrays with inline properties.** `type: array` carrying
//!   `properties`/`required` instead of `items`. Normalized to an array
//!   whose item is an object built from the required inline properties.
//!
//! [`parse`] runs once per schema. Everything downstream (defaults,
//! synthesis, validation) matches on [`SchemaNode`] and never looks at
//! the raw definition again.

use std::collections::{BTreeMap, BTreeSet};

use geometa_core::SchemaDefinitionError;
use regex::Regex;
use serde_json::{Map, Value};

/// Key under which a wildcard object's single child is synthesized.
pub const WILDCARD_PLACEHOLDER: &str = "default";

const DISJUNCTION_MARKER: &str = "anyOf";

// ---------------------------------------------------------------------------
// Node tree
// ---------------------------------------------------------------------------

/// A normalized schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Object(ObjectNode),
    Array(ArrayNode),
    Scalar(ScalarNode),
    Reference(Definition),
}

impl SchemaNode {
    /// True for scalar and reference nodes.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Reference(_))
    }

    /// The object node, if this is one.
    pub fn as_object(&self) -> Option<&ObjectNode> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Follow a path of property names through nested objects.
    ///
    /// Array nodes are stepped through transparently to their item
    /// object, so `["content_info", "attributes", "name"]` reaches the
    /// attribute name leaf.
    pub fn lookup(&self, path: &[&str]) -> Option<&SchemaNode> {
        path.iter().try_fold(self, |node, key| {
            let obj = match node {
                Self::Object(obj) => obj,
                Self::Array(arr) => arr.item_object()?,
                _ => return None,
            };
            obj.child(key)
        })
    }
}

/// An object node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectNode {
    /// Declared properties, ordered by name.
    pub properties: BTreeMap<String, SchemaNode>,
    /// Names of required properties. Always a subset of `properties`.
    pub required: BTreeSet<String>,
    /// Pattern for arbitrary keys, for wildcard-keyed objects.
    pub wildcard: Option<Wildcard>,
    /// Mutually substitutable children of a disjunction marker.
    pub alternatives: BTreeMap<String, SchemaNode>,
}

impl ObjectNode {
    /// True when keys of this object are matched by pattern.
    pub fn is_wildcard(&self) -> bool {
        self.wildcard.is_some()
    }

    /// Schema for the value under `key`: a declared property, an
    /// alternative, or the wildcard child when the key matches.
    pub fn child(&self, key: &str) -> Option<&SchemaNode> {
        self.properties
            .get(key)
            .or_else(|| self.alternatives.get(key))
            .or_else(|| {
                self.wildcard
                    .as_ref()
                    .filter(|w| w.matches(key))
                    .map(|w| w.node.as_ref())
            })
    }

    /// Required properties in name order, paired with their schemas.
    pub fn required_children(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.properties
            .iter()
            .filter(|(name, _)| self.required.contains(*name))
            .map(|(name, node)| (name.as_str(), node))
    }
}

/// Schema applied to every key matching a pattern.
#[derive(Debug, Clone)]
pub struct Wildcard {
    pattern: Regex,
    /// Schema of each matching value.
    pub node: Box<SchemaNode>,
}

impl Wildcard {
    /// The pattern as written in the raw schema.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn matches(&self, key: &str) -> bool {
        self.pattern.is_match(key)
    }
}

impl PartialEq for Wildcard {
    fn eq(&self, other: &Self) -> bool {
        self.pattern.as_str() == other.pattern.as_str() && self.node == other.node
    }
}

/// An array node.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayNode {
    /// Normal array with an `items` schema.
    Items(Box<SchemaNode>),
    /// Array whose single element is described by inline properties.
    Inline(ObjectNode),
    /// Array with no item schema.
    Untyped,
}

impl ArrayNode {
    /// Object describing each element, when elements are objects.
    pub fn item_object(&self) -> Option<&ObjectNode> {
        match self {
            Self::Items(item) => item.as_object(),
            Self::Inline(obj) => Some(obj),
            Self::Untyped => None,
        }
    }
}

/// A scalar leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarNode {
    /// Enumerated literals, in declaration order. `const` becomes a
    /// one-element enumeration.
    Enum(Vec<Value>),
    /// A primitive type.
    Primitive(PrimitiveType),
}

/// Primitive type tag of a scalar leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveType {
    String,
    Integer,
    Number,
    Boolean,
    /// A type name with no canonical default (e.g. `null`).
    Unsupported(String),
}

impl PrimitiveType {
    fn from_name(name: &str) -> Self {
        match name {
            "string" => Self::String,
            "integer" | "int" => Self::Integer,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            other => Self::Unsupported(other.to_string()),
        }
    }
}

/// A `$ref` to a shared definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    /// `#/definitions/date_or_datetime_string`
    DateOrDatetimeString,
    /// `#/definitions/i18n_string`
    I18nString,
    /// `#/definitions/i18n_array`
    I18nArray,
    /// `#/definitions/any_type`
    AnyType,
    /// Any other reference, kept verbatim.
    Other(String),
}

impl Definition {
    pub fn from_ref(reference: &str) -> Self {
        match reference {
            "#/definitions/date_or_datetime_string" => Self::DateOrDatetimeString,
            "#/definitions/i18n_string" => Self::I18nString,
            "#/definitions/i18n_array" => Self::I18nArray,
            "#/definitions/any_type" => Self::AnyType,
            other => Self::Other(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Normalize a raw schema definition into a [`SchemaNode`] tree.
///
/// # Errors
///
/// Returns [`SchemaDefinitionError`] when a leaf has none of `enum`,
/// `const`, `type`, or `$ref`, when a wildcard pattern does not compile,
/// or when a node has the wrong shape.
pub fn parse(raw: &Value) -> Result<SchemaNode, SchemaDefinitionError> {
    parse_at(raw, "")
}

fn parse_at(raw: &Value, path: &str) -> Result<SchemaNode, SchemaDefinitionError> {
    let map = raw.as_object().ok_or_else(|| malformed(path, "schema node is not a mapping"))?;

    if let Some(patterns) = map.get("patternProperties") {
        return parse_wildcard(patterns, path).map(SchemaNode::Object);
    }

    match map.get("type") {
        Some(Value::String(t)) if t == "object" => {
            parse_object(map, path, false).map(SchemaNode::Object)
        }
        Some(Value::String(t)) if t == "array" => parse_array(map, path).map(SchemaNode::Array),
        None if map.contains_key("properties") => {
            parse_object(map, path, false).map(SchemaNode::Object)
        }
        _ => parse_leaf(map, path),
    }
}

fn parse_wildcard(patterns: &Value, path: &str) -> Result<ObjectNode, SchemaDefinitionError> {
    let patterns = patterns
        .as_object()
        .ok_or_else(|| malformed(path, "patternProperties is not a mapping"))?;
    let mut entries = patterns.iter();
    let (pattern, child) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        (None, _) => return Err(malformed(path, "patternProperties is empty")),
        (Some(_), Some(_)) => {
            return Err(malformed(path, "only one patternProperties entry is supported"))
        }
    };
    let regex = Regex::new(pattern).map_err(|e| SchemaDefinitionError::InvalidPattern {
        path: path.to_string(),
        pattern: pattern.clone(),
        reason: e.to_string(),
    })?;
    let node = parse_at(child, &format!("{path}/patternProperties/{pattern}"))?;

    Ok(ObjectNode {
        properties: BTreeMap::from([(WILDCARD_PLACEHOLDER.to_string(), node.clone())]),
        required: BTreeSet::from([WILDCARD_PLACEHOLDER.to_string()]),
        wildcard: Some(Wildcard {
            pattern: regex,
            node: Box::new(node),
        }),
        alternatives: BTreeMap::new(),
    })
}

fn parse_object(
    map: &Map<String, Value>,
    path: &str,
    required_only: bool,
) -> Result<ObjectNode, SchemaDefinitionError> {
    let required_names = parse_required(map, path)?;
    let mut node = ObjectNode::default();

    let Some(props) = map.get("properties") else {
        return Ok(node);
    };
    let props = props
        .as_object()
        .ok_or_else(|| malformed(path, "properties is not a mapping"))?;

    for (name, child) in props {
        let child_path = format!("{path}/properties/{name}");
        if name == DISJUNCTION_MARKER {
            if let Value::Object(members) = child {
                for (alt_name, alt) in members {
                    let alt_node = parse_at(alt, &format!("{child_path}/{alt_name}"))?;
                    node.alternatives.insert(alt_name.clone(), alt_node);
                }
                continue;
            }
        }
        if required_only && !required_names.contains(name) {
            continue;
        }
        node.properties.insert(name.clone(), parse_at(child, &child_path)?);
    }

    for name in required_names {
        if node.properties.contains_key(&name) {
            node.required.insert(name);
        } else {
            tracing::debug!(path, property = %name, "required property has no schema; ignoring");
        }
    }
    Ok(node)
}

fn parse_required(
    map: &Map<String, Value>,
    path: &str,
) -> Result<BTreeSet<String>, SchemaDefinitionError> {
    match map.get("required") {
        None => Ok(BTreeSet::new()),
        Some(Value::Array(names)) => names
            .iter()
            .map(|n| {
                n.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| malformed(path, "required entries must be strings"))
            })
            .collect(),
        Some(_) => Err(malformed(path, "required is not a list")),
    }
}

fn parse_array(map: &Map<String, Value>, path: &str) -> Result<ArrayNode, SchemaDefinitionError> {
    match map.get("items") {
        Some(items @ Value::Object(_)) => {
            let item = parse_at(items, &format!("{path}/items"))?;
            Ok(ArrayNode::Items(Box::new(item)))
        }
        Some(_) => Err(malformed(path, "items must be a single schema mapping")),
        None if map.contains_key("properties") => {
            parse_object(map, path, true).map(ArrayNode::Inline)
        }
        None => Ok(ArrayNode::Untyped),
    }
}

fn parse_leaf(map: &Map<String, Value>, path: &str) -> Result<SchemaNode, SchemaDefinitionError> {
    if let Some(values) = map.get("enum") {
        let values = values
            .as_array()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| malformed(path, "enum must be a non-empty list"))?;
        return Ok(SchemaNode::Scalar(ScalarNode::Enum(values.clone())));
    }
    if let Some(constant) = map.get("const") {
        return Ok(SchemaNode::Scalar(ScalarNode::Enum(vec![constant.clone()])));
    }
    match map.get("type") {
        Some(Value::String(name)) => {
            return Ok(SchemaNode::Scalar(ScalarNode::Primitive(
                PrimitiveType::from_name(name),
            )))
        }
        Some(_) => return Err(malformed(path, "type must be a single type name")),
        None => {}
    }
    if let Some(reference) = map.get("$ref") {
        let reference = reference
            .as_str()
            .ok_or_else(|| malformed(path, "$ref must be a string"))?;
        return Ok(SchemaNode::Reference(Definition::from_ref(reference)));
    }
    Err(SchemaDefinitionError::UntypedLeaf {
        path: path.to_string(),
    })
}

fn malformed(path: &str, reason: &str) -> SchemaDefinitionError {
    SchemaDefinitionError::Malformed {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}
