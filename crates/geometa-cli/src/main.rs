//! # geometa CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use geometa_sidecar::GeometaConfig;

/// geometa: sidecar metadata for geospatial datasets.
///
/// Creates, validates, and refreshes MCF metadata documents written next
/// to the datasets they describe.
#[derive(Parser, Debug)]
#[command(name = "geometa", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print or write a new metadata document.
    Template(geometa_cli::template::TemplateArgs),
    /// Validate sidecar documents.
    Validate(geometa_cli::validate::ValidateArgs),
    /// Reconcile a dataset description into its sidecar.
    Describe(geometa_cli::describe::DescribeArgs),
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = GeometaConfig::from_env().context("reading configuration")?;
    let schema = config.load_schema().context("loading schema")?;
    let profile = config.load_profile().context("loading profile")?;

    match cli.command {
        Commands::Template(args) => {
            if let Some(yaml) = geometa_cli::template::run(&args, &schema, &profile)? {
                print!("{yaml}");
            }
        }
        Commands::Validate(args) => {
            let reports = geometa_cli::validate::run(&args, &schema);
            let mut failed = false;
            for report in &reports {
                if report.is_valid() {
                    println!("{}: OK", report.path.display());
                } else {
                    failed = true;
                    println!("{}: INVALID", report.path.display());
                    for problem in &report.problems {
                        println!("  {problem}");
                    }
                }
            }
            if failed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Describe(args) => {
            let path = geometa_cli::describe::run(&args, &schema, &profile)?;
            println!("{}", path.display());
        }
    }

    Ok(ExitCode::SUCCESS)
}
