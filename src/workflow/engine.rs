//! Workflow Engine Interface
//!
//! The narrow set of capabilities the rule loader needs from a workflow
//! engine. [`Workflow`] implements it for YAML workflow files; tests and
//! other front ends can supply their own implementation.

use std::path::Path;

use super::model::{IoMap, Params, Rule, Wildcards, Workflow};
use super::parser::include_workflow;
use super::wildcards::{expand_io, expand_params};
use crate::error::{Result, RuleArgsError};

/// A loaded workflow that can look up rules by name.
pub trait WorkflowEngine {
    /// Rule type handed out by [`get_rule`](Self::get_rule).
    type Rule: EngineRule;

    /// Parses `path` and adds its rules to the workflow.
    fn include(&mut self, path: &Path) -> Result<()>;

    /// Looks up a rule, failing with [`RuleArgsError::RuleNotFound`].
    fn get_rule(&self, name: &str) -> Result<&Self::Rule>;

    /// The working directory declared by the workflow, if any.
    fn workdir(&self) -> Option<&Path>;
}

/// A single rule whose templates can be expanded.
pub trait EngineRule {
    fn name(&self) -> &str;

    fn expand_input(&self, wildcards: &Wildcards) -> Result<IoMap>;

    fn expand_output(&self, wildcards: &Wildcards) -> Result<IoMap>;

    /// Expands params given the already expanded input and output.
    fn expand_params(&self, wildcards: &Wildcards, input: &IoMap, output: &IoMap) -> Result<Params>;
}

impl WorkflowEngine for Workflow {
    type Rule = Rule;

    fn include(&mut self, path: &Path) -> Result<()> {
        include_workflow(self, path)
    }

    fn get_rule(&self, name: &str) -> Result<&Rule> {
        self.rules
            .get(name)
            .ok_or_else(|| RuleArgsError::RuleNotFound {
                rule: name.to_string(),
                workflow: self.snakefile.clone(),
            })
    }

    fn workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }
}

impl EngineRule for Rule {
    fn name(&self) -> &str {
        &self.name
    }

    fn expand_input(&self, wildcards: &Wildcards) -> Result<IoMap> {
        expand_io(&self.name, &self.input, wildcards)
    }

    fn expand_output(&self, wildcards: &Wildcards) -> Result<IoMap> {
        expand_io(&self.name, &self.output, wildcards)
    }

    fn expand_params(&self, wildcards: &Wildcards, input: &IoMap, output: &IoMap) -> Result<Params> {
        expand_params(self, wildcards, input, output)
    }
}
