//! End-to-end tests for the `ruleargs` binary.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const SNAKEFILE: &str = r#"
rules:
  r:
    output:
      out: results/{sample}/out.txt
    params:
      prefix: "{sample}_run"
"#;

#[test]
fn test_cli_exports_rule() {
    let temp_dir = tempdir().unwrap();
    let snakefile = temp_dir.path().join("Snakefile.yaml");
    let defaults = temp_dir.path().join("defaults.json");
    let output = temp_dir.path().join("r.json");
    fs::write(&snakefile, SNAKEFILE).unwrap();
    fs::write(&defaults, r#"{"sample": "A"}"#).unwrap();

    Command::cargo_bin("ruleargs")
        .unwrap()
        .current_dir(temp_dir.path())
        .arg("--snakefile")
        .arg(&snakefile)
        .args(["--rule", "r", "--root"])
        .arg(temp_dir.path())
        .arg("--json")
        .arg(&defaults)
        .arg(&output)
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["params"]["prefix"], "A_run");
    assert!(json["output"]["out"]
        .as_str()
        .unwrap()
        .ends_with("results/A/out.txt"));
    assert!(temp_dir.path().join("results/A").is_dir());
}

#[test]
fn test_cli_missing_wildcard_fails_without_output() {
    let temp_dir = tempdir().unwrap();
    let snakefile = temp_dir.path().join("Snakefile.yaml");
    let output = temp_dir.path().join("r.json");
    fs::write(&snakefile, SNAKEFILE).unwrap();

    Command::cargo_bin("ruleargs")
        .unwrap()
        .current_dir(temp_dir.path())
        .arg("--snakefile")
        .arg(&snakefile)
        .args(["--rule", "r"])
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "[WARN] Rule r requires wildcards. Please see the error below",
        ))
        .stderr(predicate::function(|stderr: &str| {
            match (stderr.find("[WARN]"), stderr.find("Error:")) {
                (Some(warning), Some(error)) => warning < error,
                _ => false,
            }
        }))
        .stderr(predicate::str::contains("requires wildcard '{sample}'"));

    assert!(!output.exists());
}

#[test]
fn test_cli_unknown_rule() {
    let temp_dir = tempdir().unwrap();
    let snakefile = temp_dir.path().join("Snakefile.yaml");
    fs::write(&snakefile, SNAKEFILE).unwrap();

    Command::cargo_bin("ruleargs")
        .unwrap()
        .current_dir(temp_dir.path())
        .arg("--snakefile")
        .arg(&snakefile)
        .args(["--rule", "missing", "out.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Rule 'missing' not found"));
}

#[test]
fn test_cli_requires_output() {
    Command::cargo_bin("ruleargs")
        .unwrap()
        .args(["--snakefile", "Snakefile.yaml", "--rule", "r"])
        .assert()
        .failure();
}
