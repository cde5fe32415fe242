//! Workflow Data Model
//!
//! Core data structures for workflow definition files and the values a rule
//! produces once its templates are expanded.
//!
//! # Example YAML Format
//!
//! ```yaml
//! workdir: results/20201118
//! include:
//!   - common.yaml
//! rules:
//!   align_reads:
//!     input:
//!       reads: reads/{sample}.fastq
//!       index: [genome.1.bt2, genome.2.bt2]
//!     output:
//!       bam: aligned/{sample}.bam
//!     params:
//!       prefix: aligned/{sample}
//!       memory: "{resources.mem_mb}M"
//!     resources:
//!       mem_mb: 4000
//!     threads: 8
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::RuleArgsError;

/// Wildcard bindings supplied by the caller, keyed by wildcard name.
pub type Wildcards = IndexMap<String, String>;

/// Named input or output files after expansion.
pub type IoMap = IndexMap<String, PathValue>;

/// Named parameters after expansion.
pub type Params = IndexMap<String, Value>;

/// A concrete path, or a list of paths, bound to one input/output name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum PathValue {
    Single(PathBuf),
    Many(Vec<PathBuf>),
}

impl PathValue {
    /// Iterates over every path held by this value.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        let paths: &[PathBuf] = match self {
            Self::Single(path) => std::slice::from_ref(path),
            Self::Many(paths) => paths,
        };
        paths.iter().map(PathBuf::as_path)
    }

    /// Joins all paths with a single space, the way `{input}` renders them.
    pub fn display_joined(&self) -> String {
        self.paths()
            .map(|p| p.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// An input/output declaration before expansion: one template or a list.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum PathTemplate {
    Single(String),
    Many(Vec<String>),
}

/// A named unit of work declared in a workflow file.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Rule {
    /// Rule name (taken from the key under `rules:`)
    #[serde(skip)]
    pub name: String,

    /// Named input templates
    #[serde(default)]
    pub input: IndexMap<String, PathTemplate>,

    /// Named output templates
    #[serde(default)]
    pub output: IndexMap<String, PathTemplate>,

    /// Named parameters; strings anywhere inside are templates
    #[serde(default)]
    pub params: Params,

    /// Resource declarations, referenced from params as `{resources.name}`
    #[serde(default)]
    pub resources: IndexMap<String, Value>,

    /// Number of threads this rule requests
    #[serde(default = "default_threads")]
    pub threads: usize,
}

/// Default thread count for rules that don't specify
fn default_threads() -> usize {
    1
}

impl Rule {
    /// Creates an empty rule.
    ///
    /// # Example
    ///
    /// ```
    /// use ruleargs::workflow::Rule;
    ///
    /// let rule = Rule::new("align")
    ///     .with_input("reads", "reads/{sample}.fastq")
    ///     .with_output("bam", "aligned/{sample}.bam")
    ///     .with_threads(4);
    /// assert_eq!(rule.wildcard_names(), vec!["sample"]);
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            threads: default_threads(),
            ..Default::default()
        }
    }

    /// Declares a single-file input.
    pub fn with_input(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.input
            .insert(name.into(), PathTemplate::Single(template.into()));
        self
    }

    /// Declares a multi-file input.
    pub fn with_inputs(mut self, name: impl Into<String>, templates: Vec<String>) -> Self {
        self.input.insert(name.into(), PathTemplate::Many(templates));
        self
    }

    /// Declares a single-file output.
    pub fn with_output(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.output
            .insert(name.into(), PathTemplate::Single(template.into()));
        self
    }

    /// Declares a multi-file output.
    pub fn with_outputs(mut self, name: impl Into<String>, templates: Vec<String>) -> Self {
        self.output.insert(name.into(), PathTemplate::Many(templates));
        self
    }

    /// Adds a parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Adds a resource declaration.
    pub fn with_resource(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.resources.insert(name.into(), value.into());
        self
    }

    /// Sets the thread count for this rule.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Gets all wildcard names used in this rule's input and output, in
    /// order of first appearance.
    pub fn wildcard_names(&self) -> Vec<String> {
        use crate::workflow::wildcards::extract_wildcard_names;

        let mut seen = HashSet::new();
        let mut names = Vec::new();

        for template in self.input.values().chain(self.output.values()) {
            let parts: &[String] = match template {
                PathTemplate::Single(t) => std::slice::from_ref(t),
                PathTemplate::Many(ts) => ts,
            };
            for part in parts {
                for name in extract_wildcard_names(part) {
                    if seen.insert(name.clone()) {
                        names.push(name);
                    }
                }
            }
        }

        names
    }
}

/// The contents of a single workflow file, as written on disk.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct WorkflowFile {
    /// Working directory relative paths in this workflow are based on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<PathBuf>,

    /// Other workflow files to include, relative to this file
    #[serde(deserialize_with = "single_or_vec", default)]
    pub include: Vec<PathBuf>,

    /// Rules declared in this file, keyed by name
    #[serde(default)]
    pub rules: IndexMap<String, Rule>,
}

/// Deserializes either a single path or an array of paths into Vec<PathBuf>
fn single_or_vec<'de, D>(deserializer: D) -> Result<Vec<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let val = Value::deserialize(deserializer)?;
    match val {
        Value::Null => Ok(Vec::new()),
        Value::String(s) if s.is_empty() => Ok(Vec::new()),
        Value::String(s) => Ok(vec![PathBuf::from(s)]),
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|v| match v {
                Value::String(s) => Ok(PathBuf::from(s)),
                _ => Err(de::Error::custom("Expected string in include list")),
            })
            .collect(),
        _ => Err(de::Error::custom("Expected string or list of strings")),
    }
}

/// A loaded workflow: every rule from the bound file and its includes.
///
/// A fresh instance is created for every load; nothing is cached between
/// calls.
#[derive(Debug, Clone)]
pub struct Workflow {
    pub(crate) snakefile: PathBuf,
    pub(crate) rules: IndexMap<String, Rule>,
    pub(crate) workdir: Option<PathBuf>,
    pub(crate) included: HashSet<PathBuf>,
}

impl Workflow {
    /// Creates an empty workflow bound to `snakefile`. Nothing is read until
    /// [`include`](crate::workflow::WorkflowEngine::include) is called.
    pub fn new(snakefile: impl Into<PathBuf>) -> Self {
        Self {
            snakefile: snakefile.into(),
            rules: IndexMap::new(),
            workdir: None,
            included: HashSet::new(),
        }
    }

    /// The file this workflow was created for.
    pub fn snakefile(&self) -> &Path {
        &self.snakefile
    }

    /// Sets the workflow working directory.
    pub fn set_workdir(&mut self, workdir: impl Into<PathBuf>) {
        self.workdir = Some(workdir.into());
    }

    /// Adds a rule to the workflow.
    pub fn add_rule(&mut self, mut rule: Rule) -> crate::error::Result<()> {
        rule.name = rule.name.trim().to_string();
        if self.rules.contains_key(&rule.name) {
            return Err(RuleArgsError::DuplicateRule {
                rule: rule.name,
                path: self.snakefile.clone(),
            });
        }
        self.rules.insert(rule.name.clone(), rule);
        Ok(())
    }

    /// Returns the number of rules in the workflow.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the workflow has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
