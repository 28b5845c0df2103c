//! # Draft Conformance Checking
//!
//! Full JSON Schema (Draft 7) validation of a document against the raw
//! augmented schema, backed by the `jsonschema` crate. This complements
//! the node-tree [`crate::validate`] check with keywords the normalized
//! tree does not model (`anyOf` definitions, `type` lists, nested
//! `patternProperties` inside definitions).
//!
//! ## Offline Resolution
//!
//! Internal `$ref`s of the form `#/definitions/<name>` are resolved by
//! the jsonschema crate natively. Any other URI is answered by
//! [`OfflineRetriever`] with a permissive schema so that validation
//! never makes network requests.

use std::fmt;

use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;
use thiserror::Error;

/// Answers every external `$ref` with an accept-anything schema.
struct OfflineRetriever;

impl Retrieve for OfflineRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        tracing::debug!(uri = uri.as_str(), "external $ref answered with permissive schema");
        Ok(serde_json::json!({}))
    }
}

/// Error during conformance checking.
#[derive(Error, Debug)]
pub enum ConformanceError {
    /// The document did not conform to the schema.
    #[error("document does not conform to the schema:\n{0}")]
    Violations(ConformanceViolations),

    /// The raw schema could not be compiled.
    #[error("schema could not be compiled: {0}")]
    Build(String),
}

/// A single conformance violation.
#[derive(Debug, Clone)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of conformance violations.
#[derive(Debug, Clone)]
pub struct ConformanceViolations {
    violations: Vec<Violation>,
}

impl ConformanceViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for ConformanceViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A compiled Draft 7 validator for one raw schema.
///
/// Compiled once; `Send + Sync`, so it can be shared across threads.
pub struct ConformanceChecker {
    validator: Validator,
}

impl fmt::Debug for ConformanceChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConformanceChecker").finish_non_exhaustive()
    }
}

impl ConformanceChecker {
    /// Compile `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`ConformanceError::Build`] if the schema is not a valid
    /// Draft 7 schema.
    pub fn new(schema: &Value) -> Result<Self, ConformanceError> {
        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft7);
        opts.with_retriever(OfflineRetriever);
        let validator = opts
            .build(schema)
            .map_err(|e| ConformanceError::Build(e.to_string()))?;
        Ok(Self { validator })
    }

    /// Check `instance`, collecting every violation.
    ///
    /// # Errors
    ///
    /// Returns [`ConformanceError::Violations`] if the document does not
    /// conform.
    pub fn check(&self, instance: &Value) -> Result<(), ConformanceError> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ConformanceError::Violations(ConformanceViolations { violations }))
        }
    }
}
