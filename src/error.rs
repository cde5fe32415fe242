//! Error Types
//!
//! A single error enum covers the whole crate. Each failure keeps its
//! original cause so callers can walk the `source()` chain.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RuleArgsError>;

/// Errors raised while loading, expanding or exporting a rule.
#[derive(Debug, Error)]
pub enum RuleArgsError {
    /// The requested rule is not declared in the workflow.
    #[error("Rule '{rule}' not found in workflow '{}'", .workflow.display())]
    RuleNotFound { rule: String, workflow: PathBuf },

    /// A template needs a wildcard that was not supplied.
    #[error("Rule '{rule}' requires wildcard '{{{wildcard}}}' but no value was supplied")]
    MissingWildcard { rule: String, wildcard: String },

    /// Creating an output directory failed.
    #[error("Failed to create output directory '{}': {source}", .path.display())]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The rule record could not be represented as JSON.
    #[error("Failed to serialize rule arguments: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The requested operation is not available.
    #[error("{0} is not supported")]
    NotSupported(String),

    /// A workflow file could not be read.
    #[error("Failed to read workflow file '{}': {source}", .path.display())]
    WorkflowRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A workflow file is not valid YAML or does not match the format.
    #[error("Failed to parse workflow file '{}': {source}", .path.display())]
    WorkflowParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Two included files declare the same rule.
    #[error("Rule '{rule}' is declared more than once (again in '{}')", .path.display())]
    DuplicateRule { rule: String, path: PathBuf },

    /// A template is malformed or references something the rule lacks.
    #[error("Rule '{rule}': invalid template '{template}': {reason}")]
    InvalidTemplate {
        rule: String,
        template: String,
        reason: String,
    },

    /// A wildcard defaults file is not a flat JSON object of scalars.
    #[error("Invalid wildcard defaults in '{}': {reason}", .path.display())]
    WildcardDefaults { path: PathBuf, reason: String },

    /// The process working directory could not be read.
    #[error("Failed to read the current working directory: {source}")]
    CurrentDirectory {
        #[source]
        source: io::Error,
    },

    /// Changing the process working directory failed.
    #[error("Failed to change working directory to '{}': {source}", .path.display())]
    WorkingDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The exported JSON could not be written.
    #[error("Failed to write rule arguments to '{}': {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl RuleArgsError {
    /// Returns true if this error was caused by an unbound wildcard.
    pub fn is_missing_wildcard(&self) -> bool {
        matches!(self, Self::MissingWildcard { .. })
    }
}
