//! # geometa-core — Foundational Types for Sidecar Metadata
//!
//! This crate defines the types every other geometa crate speaks:
//!
//! 1. **Structured errors.** One [`error`] module holds the whole
//!    taxonomy: schema-authoring defects, document validation failures,
//!    stale sidecar documents, and probe failures.
//!
//! 2. **Strongly-typed descriptors.** [`FieldDescriptor`] and
//!    [`BandDescriptor`] split every attribute into an *intrinsic*
//!    subset (derived from the dataset, always refreshed) and a
//!    *descriptive* subset (authored by a human, carried forward only
//!    while the intrinsic subset is unchanged).
//!
//! 3. **Resource descriptions.** [`ResourceDescription`] is the freshly
//!    probed view of one dataset. It is created per call and never
//!    persisted directly.
//!
//! 4. **The document model.** [`Document`] wraps the nested mapping that
//!    is eventually written next to the dataset.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `geometa-*` crates.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod descriptor;
pub mod document;
pub mod error;
pub mod probe;
pub mod resource;

pub use descriptor::{BandDescriptor, Descriptive, FieldDescriptor, NoData};
pub use document::Document;
pub use error::{
    GeometaError, ProbeError, SchemaDefinitionError, StaleDocumentError, ValidationError,
};
pub use probe::Probe;
pub use resource::{
    BoundingBox, Crs, GeometryType, ResourceDescription, ResourceKind, ResourceSchema,
    SpatialExtent,
};
