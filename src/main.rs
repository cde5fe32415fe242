//! RuleArgs CLI Entry Point
//!
//! Exports one rule of a workflow file as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Export a rule with no wildcards
//! ruleargs --snakefile pipeline/Snakefile.yaml --rule all all.json
//!
//! # Supply wildcard values from a JSON object
//! ruleargs --snakefile Snakefile.yaml --rule align --json defaults.json align.json
//!
//! # Resolve relative paths against a project root
//! ruleargs --snakefile Snakefile.yaml --rule align --root /Projects/SCS align.json
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use log::{debug, info};

use ruleargs::rules::{load_wildcard_defaults, LoadOptions, RuleExporter};
use ruleargs::{APP_NAME, VERSION};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "ruleargs", version, about = "Export a workflow rule's input, output and params as JSON")]
struct Cli {
    /// Path to the workflow file
    #[arg(long)]
    snakefile: PathBuf,

    /// Name of the rule to export
    #[arg(long)]
    rule: String,

    /// Root directory relative paths are resolved against
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// JSON object file with default wildcard values
    #[arg(long = "json", value_name = "PATH")]
    wildcards_json: Option<PathBuf>,

    /// Do not create missing output directories
    #[arg(long)]
    no_create_dirs: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Output json file
    output: PathBuf,
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Main application logic.
fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    debug!("{} v{}", APP_NAME, VERSION);

    let wildcards = match &cli.wildcards_json {
        Some(path) => {
            info!("Loading wildcard defaults from {}", path.display());
            Some(load_wildcard_defaults(path)?)
        }
        None => None,
    };

    let options = LoadOptions {
        wildcards,
        root: cli.root,
        create_output_dirs: !cli.no_create_dirs,
        ..LoadOptions::default()
    };

    let exporter = RuleExporter::new(cli.snakefile);
    exporter.export_rule(cli.rule.as_str(), &cli.output, &options)?;

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
