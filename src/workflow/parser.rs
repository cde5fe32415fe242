//! Workflow Parser
//!
//! Handles loading workflow definition files from YAML and merging them
//! into a [`Workflow`]. Included files are resolved relative to the file
//! that includes them, so parsing does not depend on the process working
//! directory.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::model::{Workflow, WorkflowFile};
use crate::error::{Result, RuleArgsError};

/// Reads and parses a single workflow file without following includes.
pub fn parse_workflow_file(path: &Path) -> Result<WorkflowFile> {
    let yaml_content = fs::read_to_string(path).map_err(|source| RuleArgsError::WorkflowRead {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("YAML content loaded ({} bytes)", yaml_content.len());

    let mut file: WorkflowFile =
        serde_yaml::from_str(&yaml_content).map_err(|source| RuleArgsError::WorkflowParse {
            path: path.to_path_buf(),
            source,
        })?;

    for (name, rule) in file.rules.iter_mut() {
        rule.name = name.trim().to_string();
        debug!("Rule '{}' uses wildcards {:?}", rule.name, rule.wildcard_names());
    }

    Ok(file)
}

/// Parses `path` and merges its rules into `workflow`, following `include`
/// entries depth-first.
///
/// Each file is merged at most once, so include cycles terminate. A later
/// `workdir` overrides an earlier one.
///
/// # Example
///
/// ```rust,no_run
/// use ruleargs::workflow::{parser::include_workflow, Workflow};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut workflow = Workflow::new("pipeline/Snakefile.yaml");
///     include_workflow(&mut workflow, "pipeline/Snakefile.yaml".as_ref())?;
///     println!("Loaded {} rules", workflow.len());
///     Ok(())
/// }
/// ```
pub fn include_workflow(workflow: &mut Workflow, path: &Path) -> Result<()> {
    let key = canonical_or_plain(path);
    if !workflow.included.insert(key) {
        warn!("Skipping '{}': already included", path.display());
        return Ok(());
    }

    info!("Including workflow file: {}", path.display());
    let file = parse_workflow_file(path)?;

    if let Some(workdir) = file.workdir {
        debug!("Workflow working directory: {}", workdir.display());
        workflow.workdir = Some(workdir);
    }

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let rule_count = file.rules.len();

    for rule in file.rules.into_values() {
        if workflow.rules.contains_key(&rule.name) {
            return Err(RuleArgsError::DuplicateRule {
                rule: rule.name,
                path: path.to_path_buf(),
            });
        }
        workflow.rules.insert(rule.name.clone(), rule);
    }

    info!("Parsed {} rules from {}", rule_count, path.display());

    for include in file.include {
        let included = if include.is_absolute() {
            include
        } else {
            base.join(include)
        };
        include_workflow(workflow, &included)?;
    }

    Ok(())
}

/// Key used to detect repeated includes; falls back to the path as given
/// when it cannot be canonicalized (the read will then report the error).
fn canonical_or_plain(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::model::PathTemplate;
    use tempfile::tempdir;

    #[test]
    fn test_parse_workflow_file_not_found() {
        let result = parse_workflow_file(Path::new("/nonexistent/path/Snakefile.yaml"));
        assert!(matches!(result, Err(RuleArgsError::WorkflowRead { .. })));
    }

    #[test]
    fn test_parse_workflow_file_invalid_yaml() {
        let temp_dir = tempdir().unwrap();
        let workflow_path = temp_dir.path().join("bad.yaml");
        std::fs::write(&workflow_path, "this is not valid yaml: [[[").unwrap();

        let result = parse_workflow_file(&workflow_path);
        assert!(matches!(result, Err(RuleArgsError::WorkflowParse { .. })));
    }

    #[test]
    fn test_parse_workflow_file_sets_rule_names() {
        let temp_dir = tempdir().unwrap();
        let workflow_path = temp_dir.path().join("Snakefile.yaml");
        std::fs::write(
            &workflow_path,
            "rules:\n  count:\n    output:\n      txt: counts.txt\n",
        )
        .unwrap();

        let file = parse_workflow_file(&workflow_path).unwrap();
        assert_eq!(file.rules["count"].name, "count");
    }

    #[test]
    fn test_include_follows_relative_paths() {
        let temp_dir = tempdir().unwrap();
        let rules_dir = temp_dir.path().join("rules");
        std::fs::create_dir(&rules_dir).unwrap();

        std::fs::write(
            temp_dir.path().join("Snakefile.yaml"),
            "workdir: results\ninclude: rules/common.yaml\nrules:\n  all:\n    input:\n      done: done.txt\n",
        )
        .unwrap();
        std::fs::write(
            rules_dir.join("common.yaml"),
            "include: ../Snakefile.yaml\nrules:\n  prepare:\n    output:\n      out: prepared.txt\n",
        )
        .unwrap();

        let main = temp_dir.path().join("Snakefile.yaml");
        let mut workflow = Workflow::new(&main);
        include_workflow(&mut workflow, &main).unwrap();

        assert_eq!(workflow.len(), 2);
        assert_eq!(workflow.workdir, Some(PathBuf::from("results")));
        assert_eq!(
            workflow.rules["prepare"].output["out"],
            PathTemplate::Single("prepared.txt".to_string())
        );
    }

    #[test]
    fn test_include_duplicate_rule() {
        let temp_dir = tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join("a.yaml"),
            "include: b.yaml\nrules:\n  same: {}\n",
        )
        .unwrap();
        std::fs::write(temp_dir.path().join("b.yaml"), "rules:\n  same: {}\n").unwrap();

        let main = temp_dir.path().join("a.yaml");
        let mut workflow = Workflow::new(&main);
        let result = include_workflow(&mut workflow, &main);

        assert!(matches!(result, Err(RuleArgsError::DuplicateRule { rule, .. }) if rule == "same"));
    }

    #[test]
    fn test_parse_collects_wildcard_names() {
        let temp_dir = tempdir().unwrap();
        let workflow_path = temp_dir.path().join("Snakefile.yaml");
        std::fs::write(
            &workflow_path,
            "rules:\n  align:\n    output:\n      bam: \"{sample}.bam\"\n",
        )
        .unwrap();

        let parsed = parse_workflow_file(&workflow_path).unwrap();
        assert_eq!(parsed.rules["align"].wildcard_names(), vec!["sample"]);
    }
}
