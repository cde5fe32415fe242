//! Rule Export
//!
//! Writes a rule's arguments to a JSON document so another runtime (R,
//! typically) can pick them up without evaluating the workflow itself.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{info, warn};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use super::loader::{load_rule_args, LoadOptions, RuleArgs};
use crate::error::{Result, RuleArgsError};
use crate::workflow::Wildcards;

/// A rule to export: either a name to load or arguments already loaded.
#[derive(Debug, Clone)]
pub enum RuleRef<'a> {
    Name(&'a str),
    Args(RuleArgs),
}

impl<'a> From<&'a str> for RuleRef<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for RuleRef<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name)
    }
}

impl From<RuleArgs> for RuleRef<'_> {
    fn from(args: RuleArgs) -> Self {
        Self::Args(args)
    }
}

/// Loads and exports rules of one workflow file.
#[derive(Debug, Clone)]
pub struct RuleExporter {
    workflow_file: PathBuf,
}

impl RuleExporter {
    pub fn new(workflow_file: impl Into<PathBuf>) -> Self {
        Self {
            workflow_file: workflow_file.into(),
        }
    }

    pub fn workflow_file(&self) -> &Path {
        &self.workflow_file
    }

    /// Loads the arguments of `rule`.
    ///
    /// A missing wildcard is logged as a warning and then returned.
    pub fn load_rule(&self, rule: &str, options: &LoadOptions) -> Result<RuleArgs> {
        load_rule_args(&self.workflow_file, rule, options).map_err(|e| {
            if e.is_missing_wildcard() {
                warn!("Rule {} requires wildcards. Please see the error below", rule);
            }
            e
        })
    }

    /// Exports one rule to `destination` as JSON, returning the path written.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use ruleargs::rules::{LoadOptions, RuleExporter};
    ///
    /// fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let exporter = RuleExporter::new("Snakefile.yaml");
    ///     let options = LoadOptions::default().with_root("/Projects/SCS");
    ///     exporter.export_rule("edgeR", "edgeR.json", &options)?;
    ///     Ok(())
    /// }
    /// ```
    pub fn export_rule<'a>(
        &self,
        rule: impl Into<RuleRef<'a>>,
        destination: impl AsRef<Path>,
        options: &LoadOptions,
    ) -> Result<PathBuf> {
        let args = match rule.into() {
            RuleRef::Name(name) => self.load_rule(name, options)?,
            RuleRef::Args(args) => args,
        };
        export_rule_args(&args, destination)
    }

    /// Exporting every rule would need the engine to enumerate its rules
    /// before they are requested, which it does not offer.
    pub fn export_rules(&self, _destination: impl AsRef<Path>) -> Result<()> {
        Err(RuleArgsError::NotSupported(
            "Exporting all rules of a workflow".to_string(),
        ))
    }
}

/// Serializes rule arguments the way they are written to disk: one JSON
/// value per line, no indentation.
pub fn to_json(args: &RuleArgs) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b""));
    args.serialize(&mut serializer)
        .map_err(RuleArgsError::Serialization)?;
    Ok(buf)
}

/// Writes `args` as JSON to `destination`, taken relative to the current
/// working directory. Nothing is written if serialization fails.
pub fn export_rule_args(args: &RuleArgs, destination: impl AsRef<Path>) -> Result<PathBuf> {
    let json = to_json(args)?;

    let json_file = env::current_dir()
        .map_err(|source| RuleArgsError::CurrentDirectory { source })?
        .join(destination);
    info!("Saving json to {}", json_file.display());
    fs::write(&json_file, json).map_err(|source| RuleArgsError::OutputWrite {
        path: json_file.clone(),
        source,
    })?;

    Ok(json_file)
}

/// Reads wildcard defaults from a JSON object file.
///
/// String values are taken as-is; numbers and booleans are rendered to
/// strings. Anything else is rejected.
pub fn load_wildcard_defaults(path: impl AsRef<Path>) -> Result<Wildcards> {
    let path = path.as_ref();
    let invalid = |reason: String| RuleArgsError::WildcardDefaults {
        path: path.to_path_buf(),
        reason,
    };

    let content = fs::read_to_string(path)?;
    let raw: IndexMap<String, serde_json::Value> =
        serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;

    raw.into_iter()
        .map(|(name, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(invalid(format!(
                        "wildcard '{}' must be a string, number or boolean, got {}",
                        name, other
                    )))
                }
            };
            Ok((name, value))
        })
        .collect()
}
