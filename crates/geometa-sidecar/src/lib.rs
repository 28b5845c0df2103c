//! # geometa-sidecar — Sidecar Metadata Lifecycle
//!
//! Everything between a probed dataset and the YAML file written next
//! to it.
//!
//! - [`reconcile`]: merges a fresh [`geometa_core::ResourceDescription`]
//!   with an existing document, refreshing intrinsic properties and
//!   carrying descriptive ones forward while the dataset's structure is
//!   unchanged.
//! - [`store`]: reads and writes `<dataset>.yml`.
//! - [`control`]: the [`Sidecar`] editing API, with validation before
//!   every committed edit.
//! - [`config`]: environment-driven selection of schema and profile.
//!
//! ## Crate Policy
//!
//! - Stale sidecars are never errors. They are logged at `warn` and the
//!   document is rebuilt from the schema template.
//! - A schema is borrowed, never owned or mutated.

pub mod config;
pub mod control;
pub mod reconcile;
pub mod store;

pub use config::{ConfigError, GeometaConfig, License, Profile};
pub use control::{DescriptiveUpdate, Sidecar, Vocabulary};
pub use reconcile::{reconcile_bands, reconcile_fields, Base, Reconciler};
pub use store::{sidecar_path, SidecarStore};
