//! # MCF Schema
//!
//! The Metadata Control File (MCF) core schema, augmented for sidecar
//! documents and normalized once into an immutable [`McfSchema`].
//!
//! ## Augmentation
//!
//! The core schema is stricter in some places and looser in others than
//! sidecars need. [`augment`] returns a patched copy of the raw schema:
//!
//! - `content_info` is required at the root, and `attributes` within it.
//! - Each keyword section requires exactly `keywords`.
//! - An optional `resource` section holds the dataset's kind, path, and
//!   source files.
//!
//! The raw input is never modified. Build one [`McfSchema`] at startup
//! and pass it to every synthesis, validation, and reconciliation call.

use std::fmt;
use std::path::Path;

use geometa_core::document::yaml_to_json_value;
use geometa_core::{Document, SchemaDefinitionError, ValidationError};
use serde_json::{json, Value};

use crate::conformance::{ConformanceChecker, ConformanceError};
use crate::node::{parse, ScalarNode, SchemaNode};
use crate::template::synthesize;
use crate::validate::{validate, validate_all};

/// The MCF core schema shipped with geometa.
pub const BUNDLED_MCF_SCHEMA: &str = include_str!("../../../schemas/mcf-core.yaml");

/// An augmented, normalized MCF schema.
///
/// Read-only after construction and `Send + Sync`.
pub struct McfSchema {
    raw: Value,
    root: SchemaNode,
    version: String,
    conformance: ConformanceChecker,
}

impl fmt::Debug for McfSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("McfSchema")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl McfSchema {
    /// Load the bundled MCF core schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDefinitionError`] if the bundled schema is defective.
    pub fn bundled() -> Result<Self, SchemaDefinitionError> {
        let raw = parse_schema_text(BUNDLED_MCF_SCHEMA, "bundled mcf-core.yaml", true)?;
        Self::from_raw(&raw)
    }

    /// Load an MCF schema from a YAML or JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDefinitionError::Load`] if the file cannot be read
    /// or decoded, or any other variant if the schema is defective.
    pub fn from_file(path: &Path) -> Result<Self, SchemaDefinitionError> {
        let raw = load_schema_file(path)?;
        Self::from_raw(&raw)
    }

    /// Augment and normalize a raw MCF schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDefinitionError`] if an augmentation target is
    /// missing, a node is defective, or the schema does not compile.
    pub fn from_raw(raw: &Value) -> Result<Self, SchemaDefinitionError> {
        let raw = augment(raw)?;
        let root = parse(&raw)?;
        let version = match root.lookup(&["mcf", "version"]) {
            Some(SchemaNode::Scalar(ScalarNode::Enum(values))) => values
                .first()
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }
        .ok_or_else(|| SchemaDefinitionError::Malformed {
            path: "/properties/mcf/properties/version".to_string(),
            reason: "mcf.version must declare a constant string".to_string(),
        })?;
        let conformance =
            ConformanceChecker::new(&raw).map_err(|e| SchemaDefinitionError::Malformed {
                path: String::new(),
                reason: e.to_string(),
            })?;
        tracing::debug!(version = %version, "loaded MCF schema");
        Ok(Self {
            raw,
            root,
            version,
            conformance,
        })
    }

    /// The augmented raw schema.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The normalized root node.
    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    /// The MCF format revision (`mcf.version`).
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The minimal document satisfying every required property.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaDefinitionError`] if a required leaf has no
    /// canonical default.
    pub fn template(&self) -> Result<Document, SchemaDefinitionError> {
        synthesize(&self.root).map(Document::new)
    }

    /// Validate a document, returning the first violation.
    pub fn validate(&self, document: &Value) -> Result<(), ValidationError> {
        validate(document, &self.root)
    }

    /// Validate a document, collecting every violation.
    pub fn validate_all(&self, document: &Value) -> Vec<ValidationError> {
        validate_all(document, &self.root)
    }

    /// Full Draft 7 conformance check against the augmented raw schema.
    pub fn check_conformance(&self, document: &Value) -> Result<(), ConformanceError> {
        self.conformance.check(document)
    }
}

/// Return a copy of the raw MCF schema with sidecar augmentations applied.
///
/// # Errors
///
/// Returns [`SchemaDefinitionError::Malformed`] if a section the
/// augmentation patches is missing from the raw schema.
pub fn augment(raw: &Value) -> Result<Value, SchemaDefinitionError> {
    let mut schema = raw.clone();

    push_required(&mut schema, "", "content_info")?;
    push_required(&mut schema, "/properties/content_info", "attributes")?;

    let keyword_section = "/properties/identification/properties/keywords/patternProperties/^.*";
    section_mut(&mut schema, keyword_section)?
        .as_object_mut()
        .ok_or_else(|| not_a_mapping(keyword_section))?
        .insert("required".to_string(), json!(["keywords"]));

    let properties = section_mut(&mut schema, "/properties")?
        .as_object_mut()
        .ok_or_else(|| not_a_mapping("/properties"))?;
    properties.insert("resource".to_string(), resource_section());

    Ok(schema)
}

fn resource_section() -> Value {
    json!({
        "type": "object",
        "description": "intrinsic properties of the described dataset",
        "properties": {
            "kind": {
                "type": "string",
                "enum": ["archive", "table", "vector", "raster"]
            },
            "path": {"type": "string"},
            "sources": {"type": "array", "items": {"type": "string"}}
        },
        "required": ["kind", "path", "sources"]
    })
}

fn section_mut<'a>(schema: &'a mut Value, pointer: &str) -> Result<&'a mut Value, SchemaDefinitionError> {
    schema
        .pointer_mut(pointer)
        .ok_or_else(|| SchemaDefinitionError::Malformed {
            path: pointer.to_string(),
            reason: "section required by sidecar augmentation is missing".to_string(),
        })
}

fn push_required(schema: &mut Value, pointer: &str, name: &str) -> Result<(), SchemaDefinitionError> {
    let section = section_mut(schema, pointer)?
        .as_object_mut()
        .ok_or_else(|| not_a_mapping(pointer))?;
    let required = section
        .entry("required")
        .or_insert_with(|| Value::Array(Vec::new()));
    let list = required.as_array_mut().ok_or_else(|| SchemaDefinitionError::Malformed {
        path: pointer.to_string(),
        reason: "required is not a list".to_string(),
    })?;
    if !list.iter().any(|v| v == name) {
        list.push(json!(name));
    }
    Ok(())
}

fn not_a_mapping(pointer: &str) -> SchemaDefinitionError {
    SchemaDefinitionError::Malformed {
        path: pointer.to_string(),
        reason: "schema node is not a mapping".to_string(),
    }
}

/// Load a raw schema from a YAML (`.yaml`/`.yml`) or JSON file.
///
/// # Errors
///
/// Returns [`SchemaDefinitionError::Load`] if the file cannot be read or
/// decoded.
pub fn load_schema_file(path: &Path) -> Result<Value, SchemaDefinitionError> {
    let origin = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| SchemaDefinitionError::Load {
        origin: origin.clone(),
        reason: format!("cannot read file: {e}"),
    })?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    parse_schema_text(&content, &origin, is_yaml)
}

fn parse_schema_text(content: &str, origin: &str, is_yaml: bool) -> Result<Value, SchemaDefinitionError> {
    let load_error = |reason: String| SchemaDefinitionError::Load {
        origin: origin.to_string(),
        reason,
    };
    if is_yaml {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| load_error(format!("invalid YAML: {e}")))?;
        yaml_to_json_value(&yaml)
            .map_err(|e| load_error(format!("YAML-to-JSON conversion failed: {e}")))
    } else {
        serde_json::from_str(content).map_err(|e| load_error(format!("invalid JSON: {e}")))
    }
}
