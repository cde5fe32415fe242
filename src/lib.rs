//! RuleArgs - Workflow Rule Argument Extraction
//!
//! Loads a single rule from a workflow definition file and returns its
//! input, output and params as they would be seen inside a pipeline run,
//! with paths made absolute. The result can be used directly or written to
//! JSON so scripts in other languages (R, for instance) can be developed
//! against the same paths as the pipeline.
//!
//! # Architecture
//!
//! - [`workflow`]: Workflow files, rules and wildcard expansion
//! - [`rules`]: Path resolution, rule loading and JSON export
//! - [`error`]: The crate-wide error type
//!
//! # Example
//!
//! ```rust,no_run
//! use ruleargs::rules::{LoadOptions, RuleExporter};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let wildcards = [("sample".to_string(), "A".to_string())].into_iter().collect();
//!     let options = LoadOptions::default()
//!         .with_wildcards(wildcards)
//!         .with_root("/proj");
//!
//!     let exporter = RuleExporter::new("pipeline/Snakefile.yaml");
//!     let args = exporter.load_rule("align", &options)?;
//!     println!("{:?}", args.output());
//!
//!     exporter.export_rule("align", "align.json", &options)?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod rules;
pub mod workflow;

// Re-export commonly used types
pub use error::{Result, RuleArgsError};
pub use rules::{load_rule_args, LoadOptions, RuleArgs, RuleExporter};
pub use workflow::{Rule, Wildcards, Workflow};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "RuleArgs";
