//! # geometa-cli — Sidecar Metadata Command-Line Interface
//!
//! ## Subcommands
//!
//! - `template`: emit a new, stamped MCF document
//! - `validate`: check a sidecar against the schema
//! - `describe`: reconcile a probed dataset description into its sidecar
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to domain crates; no business logic here.
//! - Schema and profile come from [`geometa_sidecar::GeometaConfig`].

pub mod describe;
pub mod template;
pub mod validate;
