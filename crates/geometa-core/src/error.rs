//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout geometa. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations,
//! except [`ValidationError`], whose display depends on whether the
//! failing path is the document root.
//!
//! ## Taxonomy
//!
//! - [`SchemaDefinitionError`]: the schema itself is defective. Fatal,
//!   surfaced immediately.
//! - [`ValidationError`]: a document fails schema checks. Reported with
//!   the failing path, never corrected automatically.
//! - [`StaleDocumentError`]: a previously written sidecar could not be
//!   used. Logged by the caller and treated as if no sidecar existed.
//! - [`ProbeError`]: the dataset could not be inspected.

use std::fmt;

use thiserror::Error;

/// Top-level error type for geometa.
#[derive(Error, Debug)]
pub enum GeometaError {
    /// The schema is defective.
    #[error("schema definition error: {0}")]
    SchemaDefinition(#[from] SchemaDefinitionError),

    /// A document did not satisfy the schema.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The dataset could not be probed.
    #[error("probe error: {0}")]
    Probe(#[from] ProbeError),

    /// No field with the given name exists in the document.
    #[error("no field named '{0}' in content_info.attributes")]
    UnknownField(String),

    /// No band with the given 1-based index exists in the document.
    #[error("no band with index {0} in content_info.attributes")]
    UnknownBand(u32),

    /// A resource description violated one of its invariants.
    #[error("invalid resource description: {0}")]
    InvalidDescription(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A schema-authoring defect discovered while parsing a schema or
/// resolving one of its leaves.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaDefinitionError {
    /// A leaf carries none of `enum`, `const`, `type`, or `$ref`.
    #[error("schema node at '{path}' has no enum, const, type, or $ref")]
    UntypedLeaf {
        /// Schema path of the offending node.
        path: String,
    },

    /// A leaf declares a primitive type with no canonical default.
    #[error("schema node at '{path}' declares unsupported type '{type_name}'")]
    UnknownType {
        /// Schema path of the offending node.
        path: String,
        /// The declared type name.
        type_name: String,
    },

    /// A `$ref` names a definition with no canonical default.
    #[error("schema node at '{path}' references unknown definition '{reference}'")]
    UnknownReference {
        /// Schema path of the offending node.
        path: String,
        /// The reference string as written.
        reference: String,
    },

    /// A wildcard key pattern is not a valid regular expression.
    #[error("schema node at '{path}' has invalid key pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Schema path of the offending node.
        path: String,
        /// The pattern as written.
        pattern: String,
        /// Regex compiler message.
        reason: String,
    },

    /// A node has the wrong shape (e.g. `properties` is not a mapping).
    #[error("schema node at '{path}' is malformed: {reason}")]
    Malformed {
        /// Schema path of the offending node.
        path: String,
        /// What was wrong.
        reason: String,
    },

    /// The raw schema could not be read or decoded.
    #[error("schema could not be loaded from '{origin}': {reason}")]
    Load {
        /// File path or identifier of the schema.
        origin: String,
        /// Why loading failed.
        reason: String,
    },
}

/// A single document validation failure.
///
/// `path` is a JSON Pointer into the document (`""` for the root).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// JSON Pointer path to the violating value.
    pub path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl ValidationError {
    /// Create a validation error at `path`.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// An existing sidecar document that cannot serve as a reconciliation base.
///
/// Never propagated as a hard failure: callers log it and proceed as if
/// no sidecar existed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StaleDocumentError {
    /// The sidecar exists but could not be read.
    #[error("sidecar '{path}' could not be read: {reason}")]
    Unreadable {
        /// Sidecar path.
        path: String,
        /// IO failure.
        reason: String,
    },

    /// The sidecar is not well-formed YAML.
    #[error("sidecar '{path}' is not valid YAML: {reason}")]
    Unparsable {
        /// Sidecar path.
        path: String,
        /// Parser message.
        reason: String,
    },

    /// The document root is not a mapping.
    #[error("existing document root is not a mapping")]
    NotAMapping,

    /// The attribute list could not be decoded into descriptors.
    #[error("existing document has malformed attributes: {0}")]
    MalformedAttributes(String),
}

/// Failure to inspect a dataset.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The dataset does not exist.
    #[error("{path} does not exist")]
    NotFound {
        /// Dataset path.
        path: String,
    },

    /// The dataset exists but its type is not recognized.
    #[error("unsupported dataset '{path}': {reason}")]
    Unsupported {
        /// Dataset path.
        path: String,
        /// Why detection failed.
        reason: String,
    },

    /// Reading dataset properties failed.
    #[error("failed to probe '{path}': {reason}")]
    Failed {
        /// Dataset path.
        path: String,
        /// Underlying failure.
        reason: String,
    },
}
