//! # geometa-schema — Schema Normalization, Synthesis & Validation
//!
//! Turns a raw MCF schema definition into a typed node tree once, then
//! answers every schema question from that tree.
//!
//! ## Normalization (`node`)
//!
//! [`parse`] rewrites the irregular shapes of real schemas (wildcard-keyed
//! objects, `anyOf` disjunction markers, arrays described by inline
//! properties) into a [`SchemaNode`] enum. Nothing downstream inspects
//! raw schema keywords.
//!
//! ## Templates (`defaults`, `template`)
//!
//! - [`resolve_default`] gives every leaf one canonical zero-value.
//! - [`synthesize`] builds the minimal document holding every required
//!   property.
//!
//! ## Validation (`validate`, `conformance`)
//!
//! [`validate`] walks a document against the node tree and reports
//! missing required properties, type mismatches, and enum violations.
//! [`ConformanceChecker`] runs a full Draft 7 check through the
//! `jsonschema` crate for keywords the tree does not model.
//!
//! ## MCF (`mcf`)
//!
//! [`McfSchema`] bundles the augmented MCF core schema, its node tree,
//! and its compiled conformance checker. Build it once and share it.
//!
//! ## Crate Policy
//!
//! - Depends only on `geometa-core` internally.
//! - Schema problems are [`geometa_core::SchemaDefinitionError`]s and
//!   surface at load or synthesis time. Document problems are
//!   [`geometa_core::ValidationError`]s and are advisory.

pub mod conformance;
pub mod defaults;
pub mod mcf;
pub mod node;
pub mod template;
pub mod validate;

pub use conformance::{ConformanceChecker, ConformanceError, ConformanceViolations, Violation};
pub use defaults::resolve_default;
pub use mcf::{augment, load_schema_file, McfSchema, BUNDLED_MCF_SCHEMA};
pub use node::{
    parse, ArrayNode, Definition, ObjectNode, PrimitiveType, ScalarNode, SchemaNode, Wildcard,
    WILDCARD_PLACEHOLDER,
};
pub use template::synthesize;
pub use validate::{validate, validate_all};
