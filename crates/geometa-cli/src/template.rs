//! # Template Subcommand
//!
//! Emits a blank document holding every required MCF property, stamped
//! with a fresh identifier and today's date.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use geometa_schema::McfSchema;
use geometa_sidecar::{Profile, Sidecar, SidecarStore};

/// Arguments for the template subcommand.
#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Write to this file instead of standard output.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Render the template as YAML, or write it to `args.output`.
///
/// Returns the YAML when no output file was given.
pub fn run(args: &TemplateArgs, schema: &McfSchema, profile: &Profile) -> anyhow::Result<Option<String>> {
    let sidecar = Sidecar::blank(schema, profile).context("synthesizing template")?;
    match &args.output {
        Some(path) => {
            sidecar
                .write_to(&SidecarStore::new(path))
                .with_context(|| format!("writing {}", path.display()))?;
            Ok(None)
        }
        None => Ok(Some(sidecar.document().to_yaml_string()?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_to_stdout_is_yaml() {
        let schema = McfSchema::bundled().unwrap();
        let yaml = run(&TemplateArgs { output: None }, &schema, &Profile::default())
            .unwrap()
            .unwrap();
        assert!(yaml.contains("version: '1.0'"));
        assert!(yaml.contains("hierarchylevel: dataset"));
    }

    #[test]
    fn template_to_file() {
        let schema = McfSchema::bundled().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.yml");
        let out = run(
            &TemplateArgs {
                output: Some(path.clone()),
            },
            &schema,
            &Profile::default(),
        )
        .unwrap();
        assert!(out.is_none());
        assert!(SidecarStore::new(&path).load().unwrap().is_some());
    }
}
