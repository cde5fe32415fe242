//! Rule Argument Extraction Module
//!
//! Turns one rule of a workflow into a plain record of resolved paths and
//! params, and exports that record as JSON.
//!
//! # Architecture
//!
//! - [`paths`]: Resolving relative paths against a root and workflow workdir
//! - [`workdir`]: Scoped change of the process working directory
//! - [`loader`]: Loading, expanding and resolving a single rule
//! - [`export`]: Writing rule arguments as JSON

pub mod export;
pub mod loader;
pub mod paths;
pub mod workdir;

pub use export::{export_rule_args, load_wildcard_defaults, RuleExporter, RuleRef};
pub use loader::{create_output_dirs, load_rule_args, load_rule_args_with, LoadOptions, RuleArgs};
pub use paths::{resolve, resolve_many, ResolvePaths};
pub use workdir::WorkingDirGuard;
