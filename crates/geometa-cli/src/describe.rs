//! # Describe Subcommand
//!
//! Reconciles a dataset description, produced by an external probe and
//! saved as YAML or JSON, into the dataset's sidecar.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use geometa_core::document::yaml_to_json_value;
use geometa_core::ResourceDescription;
use geometa_schema::McfSchema;
use geometa_sidecar::{Profile, Sidecar, SidecarStore};

/// Arguments for the describe subcommand.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Resource description file (YAML or JSON).
    pub description: PathBuf,

    /// Sidecar to reconcile with and write (default: `<dataset>.yml`).
    #[arg(long)]
    pub sidecar: Option<PathBuf>,
}

/// Reconcile and write. Returns the sidecar path.
pub fn run(args: &DescribeArgs, schema: &McfSchema, profile: &Profile) -> anyhow::Result<PathBuf> {
    let description = read_description(&args.description)?;
    let store = match &args.sidecar {
        Some(path) => SidecarStore::new(path),
        None => SidecarStore::for_dataset(&description.path),
    };
    let sidecar = Sidecar::from_description(schema, profile, &description, store)
        .with_context(|| format!("describing {}", description.path))?;
    sidecar.write()?;
    sidecar
        .path()
        .map(PathBuf::from)
        .context("reconciled document has no sidecar path")
}

fn read_description(path: &Path) -> anyhow::Result<ResourceDescription> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let yaml: serde_yaml::Value = serde_yaml::from_str(&content)
        .with_context(|| format!("parsing {}", path.display()))?;
    let value = yaml_to_json_value(&yaml).map_err(anyhow::Error::msg)?;
    serde_json::from_value(value).with_context(|| format!("decoding {}", path.display()))
}
