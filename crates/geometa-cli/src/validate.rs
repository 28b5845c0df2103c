//! # Validate Subcommand
//!
//! Checks sidecar documents against the MCF schema. `--strict` adds the
//! full Draft 7 conformance check.

use std::path::{Path, PathBuf};

use clap::Args;
use geometa_schema::{ConformanceError, McfSchema};
use geometa_sidecar::SidecarStore;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Sidecar files to validate.
    #[arg(required = true)]
    pub sidecars: Vec<PathBuf>,

    /// Also run the full JSON Schema conformance check.
    #[arg(long)]
    pub strict: bool,
}

/// Outcome for one sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub path: PathBuf,
    pub problems: Vec<String>,
}

impl Report {
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Validate every sidecar named in `args`.
pub fn run(args: &ValidateArgs, schema: &McfSchema) -> Vec<Report> {
    args.sidecars
        .iter()
        .map(|path| Report {
            path: path.clone(),
            problems: problems(path, schema, args.strict),
        })
        .collect()
}

fn problems(path: &Path, schema: &McfSchema, strict: bool) -> Vec<String> {
    let document = match SidecarStore::new(path).load() {
        Ok(Some(document)) => document,
        Ok(None) => return vec!["file does not exist".to_string()],
        Err(e) => return vec![e.to_string()],
    };

    let mut problems: Vec<String> = schema
        .validate_all(&document)
        .iter()
        .map(ToString::to_string)
        .collect();
    if strict {
        match schema.check_conformance(&document) {
            Ok(()) => {}
            Err(ConformanceError::Violations(violations)) => problems.extend(
                violations
                    .violations()
                    .iter()
                    .map(|v| format!("[strict] {}", v.to_string().trim_start())),
            ),
            Err(e) => problems.push(e.to_string()),
        }
    }
    tracing::debug!(path = %path.display(), count = problems.len(), "validated sidecar");
    problems
}

#[cfg(test)]
mod tests {
    use super::*;
    use geometa_sidecar::{Profile, Sidecar};

    #[test]
    fn template_is_valid_in_strict_mode() {
        let schema = McfSchema::bundled().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.yml");
        Sidecar::blank(&schema, &Profile::default())
            .unwrap()
            .write_to(&SidecarStore::new(&path))
            .unwrap();
        let reports = run(
            &ValidateArgs {
                sidecars: vec![path],
                strict: true,
            },
            &schema,
        );
        assert!(reports[0].is_valid(), "{:?}", reports[0].problems);
    }

    #[test]
    fn problems_are_reported_per_file() {
        let schema = McfSchema::bundled().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.yml");
        std::fs::write(&bad, "mcf:\n  version: '2.0'\n").unwrap();
        let missing = dir.path().join("missing.yml");
        let reports = run(
            &ValidateArgs {
                sidecars: vec![bad, missing],
                strict: false,
            },
            &schema,
        );
        assert!(!reports[0].is_valid());
        assert!(reports[0].problems.iter().any(|p| p.starts_with("/mcf/version")));
        assert_eq!(reports[1].problems, vec!["file does not exist".to_string()]);
    }
}
