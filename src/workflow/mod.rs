//! Workflow Definition Module
//!
//! Provides the workflow engine the rule loader drives: data structures,
//! YAML parsing with includes, and wildcard/template expansion.
//!
//! # Structure
//!
//! - [`model`]: Core data structures (Rule, Workflow, expanded values)
//! - [`parser`]: YAML parsing and include handling
//! - [`wildcards`]: Template placeholders and expansion
//! - [`engine`]: Capability traits the loader is generic over

pub mod engine;
pub mod model;
pub mod parser;
pub mod wildcards;

pub use engine::{EngineRule, WorkflowEngine};
pub use model::{IoMap, Params, PathTemplate, PathValue, Rule, Wildcards, Workflow, WorkflowFile};
pub use parser::{include_workflow, parse_workflow_file};
pub use wildcards::{extract_wildcard_names, format_template, TemplateError};
