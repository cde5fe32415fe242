//! Rule Argument Loader
//!
//! Loads a workflow file, looks up one rule and returns its expanded and
//! resolved input, output and params for a set of wildcard values.
//!
//! The process working directory is switched to the workflow file's
//! directory while the engine runs and restored afterwards on every exit
//! path, unless [`LoadOptions::change_dir`] asks to keep it. Loads are not
//! safe to run concurrently within one process.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::paths::{anchor_root, resolve_many};
use super::workdir::WorkingDirGuard;
use crate::error::{Result, RuleArgsError};
use crate::workflow::{EngineRule, IoMap, Params, PathValue, Wildcards, Workflow, WorkflowEngine};

/// A rule's bindings after expansion and path resolution.
///
/// Serializes to a JSON object with the keys `input`, `output`, `params`
/// and `wildcards`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RuleArgs {
    input: IoMap,
    output: IoMap,
    params: Params,
    wildcards: Wildcards,
}

impl RuleArgs {
    pub fn new(input: IoMap, output: IoMap, params: Params, wildcards: Wildcards) -> Self {
        Self {
            input,
            output,
            params,
            wildcards,
        }
    }

    pub fn input(&self) -> &IoMap {
        &self.input
    }

    pub fn output(&self) -> &IoMap {
        &self.output
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn wildcards(&self) -> &Wildcards {
        &self.wildcards
    }
}

/// Options for [`load_rule_args`].
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Wildcard values used for expansion (empty when `None`)
    pub wildcards: Option<Wildcards>,

    /// Stay in the workflow file's directory after loading
    pub change_dir: bool,

    /// Create missing parent directories of every output
    pub create_output_dirs: bool,

    /// Directory relative paths are resolved against
    pub root: PathBuf,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            wildcards: None,
            change_dir: false,
            create_output_dirs: true,
            root: PathBuf::from("."),
        }
    }
}

impl LoadOptions {
    /// Sets the wildcard values.
    pub fn with_wildcards(mut self, wildcards: Wildcards) -> Self {
        self.wildcards = Some(wildcards);
        self
    }

    /// Sets the root directory for path resolution.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Keeps the workflow directory as working directory after loading.
    pub fn with_change_dir(mut self, change_dir: bool) -> Self {
        self.change_dir = change_dir;
        self
    }

    /// Enables or disables output directory creation.
    pub fn with_create_output_dirs(mut self, create: bool) -> Self {
        self.create_output_dirs = create;
        self
    }
}

/// Loads a rule's arguments from a YAML workflow file.
///
/// # Example
///
/// ```rust,no_run
/// use ruleargs::rules::{load_rule_args, LoadOptions};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let wildcards = [("ds_dir".to_string(), "full_data_samplefilter".to_string())]
///         .into_iter()
///         .collect();
///     let options = LoadOptions::default().with_wildcards(wildcards);
///
///     let args = load_rule_args("Snakefile.yaml", "create_prediction_target", &options)?;
///     println!("{:?}", args.output());
///     Ok(())
/// }
/// ```
pub fn load_rule_args(
    workflow_file: impl AsRef<Path>,
    rule_name: &str,
    options: &LoadOptions,
) -> Result<RuleArgs> {
    load_rule_args_with(workflow_file.as_ref(), rule_name, options, |path: &Path| {
        Workflow::new(path)
    })
}

/// Loads a rule's arguments using any [`WorkflowEngine`].
///
/// `make_engine` receives the workflow file anchored at the original
/// working directory and must return a fresh engine; nothing is reused
/// between calls.
pub fn load_rule_args_with<E, F>(
    workflow_file: &Path,
    rule_name: &str,
    options: &LoadOptions,
    make_engine: F,
) -> Result<RuleArgs>
where
    E: WorkflowEngine,
    F: FnOnce(&Path) -> E,
{
    let wildcards = options.wildcards.clone().unwrap_or_default();

    let original =
        env::current_dir().map_err(|source| RuleArgsError::CurrentDirectory { source })?;
    let snakefile = original.join(workflow_file);
    let workflow_dir = snakefile.parent().unwrap_or(original.as_path()).to_path_buf();

    info!("Loading rule '{}' from {}", rule_name, snakefile.display());

    let mut guard = WorkingDirGuard::enter(&workflow_dir)?;
    if options.change_dir {
        guard.retain();
    }

    let mut engine = make_engine(&snakefile);
    engine.include(&snakefile)?;

    let rule = engine.get_rule(rule_name)?;
    let input = rule.expand_input(&wildcards)?;
    let output = rule.expand_output(&wildcards)?;
    let params = rule.expand_params(&wildcards, &input, &output)?;

    let root = anchor_root(guard.original(), &options.root);
    let workdir = engine.workdir();
    debug!(
        "Resolving paths against root {} (workdir: {:?})",
        root.display(),
        workdir
    );

    let input = resolve_many(&input, &root, workdir);
    let output = resolve_many(&output, &root, workdir);

    if options.create_output_dirs {
        create_output_dirs(&output, guard.original())?;
    }

    Ok(RuleArgs {
        input,
        output,
        params,
        wildcards,
    })
}

/// Creates the parent directory of every output path, relative to `base`.
///
/// Directories that already exist, including ones created concurrently by
/// someone else, are left alone.
pub fn create_output_dirs(output: &IoMap, base: &Path) -> Result<()> {
    for path in output.values().flat_map(PathValue::paths) {
        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            continue;
        };

        let dest_folder = base.join(parent);
        if dest_folder.is_dir() {
            continue;
        }

        info!("Creating output directory {}", dest_folder.display());
        fs::create_dir_all(&dest_folder).map_err(|source| RuleArgsError::DirectoryCreation {
            path: dest_folder.clone(),
            source,
        })?;
    }
    Ok(())
}
