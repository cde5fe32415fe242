//! Wildcard Detection and Template Expansion
//!
//! Templates use brace placeholders:
//! - `{sample}` is replaced by the bound value of wildcard `sample`
//! - `{sample,[A-Z]+}` carries a constraint after the comma, which is
//!   ignored here since values are supplied, never matched
//! - `{{` and `}}` produce literal braces
//!
//! Params additionally understand `{input}`, `{output}`, `{input.name}`,
//! `{output.name}`, `{resources.name}`, `{threads}` and `{wildcards.name}`.

use std::path::PathBuf;

use indexmap::IndexMap;
use log::debug;
use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};

use crate::error::{Result, RuleArgsError};
use crate::workflow::model::{IoMap, Params, PathTemplate, PathValue, Rule, Wildcards};

/// Why a single template could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A wildcard placeholder has no bound value.
    Unbound(String),
    /// A dotted reference names something the rule does not declare.
    Unknown(String),
    /// The template itself is syntactically broken.
    Malformed(String),
}

impl TemplateError {
    fn into_rule_error(self, rule: &str, template: &str) -> RuleArgsError {
        match self {
            Self::Unbound(wildcard) => RuleArgsError::MissingWildcard {
                rule: rule.to_string(),
                wildcard,
            },
            Self::Unknown(key) => RuleArgsError::InvalidTemplate {
                rule: rule.to_string(),
                template: template.to_string(),
                reason: format!("unknown reference '{{{}}}'", key),
            },
            Self::Malformed(reason) => RuleArgsError::InvalidTemplate {
                rule: rule.to_string(),
                template: template.to_string(),
                reason,
            },
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Literal(String),
    Placeholder(&'a str),
}

/// Splits a template into literal text and placeholder names.
fn tokenize(template: &str) -> std::result::Result<Vec<Token<'_>>, TemplateError> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = template.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        match ch {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                literal.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                literal.push('}');
            }
            '}' => {
                return Err(TemplateError::Malformed(format!(
                    "single '}}' at offset {}",
                    start
                )));
            }
            '{' => {
                // Constraints may nest braces, e.g. {id,\d{3}}
                let mut depth = 1;
                let mut end = None;
                for (idx, inner) in chars.by_ref() {
                    match inner {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                end = Some(idx);
                                break;
                            }
                        }
                        _ => {}
                    }
                }
                let end = end.ok_or_else(|| {
                    TemplateError::Malformed(format!("unclosed '{{' at offset {}", start))
                })?;

                let body = &template[start + 1..end];
                let name = body.split(',').next().unwrap_or_default().trim();
                if name.is_empty() || name.contains('{') || name.contains('}') {
                    return Err(TemplateError::Malformed(format!(
                        "invalid placeholder '{{{}}}'",
                        body
                    )));
                }

                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(Token::Placeholder(name));
            }
            _ => literal.push(ch),
        }
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    Ok(tokens)
}

/// Extracts placeholder names from a template, in order of appearance.
///
/// A malformed template yields no names.
///
/// # Example
/// ```
/// use ruleargs::workflow::wildcards::extract_wildcard_names;
///
/// assert_eq!(extract_wildcard_names("reads/{sample}.fastq"), vec!["sample"]);
/// assert_eq!(extract_wildcard_names("{id,\\d{3}}_{{raw}}.txt"), vec!["id"]);
/// ```
pub fn extract_wildcard_names(pattern: &str) -> Vec<String> {
    tokenize(pattern)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|token| match token {
            Token::Placeholder(name) => Some(name.to_string()),
            Token::Literal(_) => None,
        })
        .collect()
}

/// Renders a template, resolving each placeholder through `lookup`.
///
/// # Example
/// ```
/// use ruleargs::workflow::wildcards::{format_template, TemplateError};
///
/// let out = format_template("results/{sample}/out.txt", |name| match name {
///     "sample" => Ok("A".to_string()),
///     other => Err(TemplateError::Unbound(other.to_string())),
/// });
/// assert_eq!(out, Ok("results/A/out.txt".to_string()));
/// ```
pub fn format_template<F>(template: &str, mut lookup: F) -> std::result::Result<String, TemplateError>
where
    F: FnMut(&str) -> std::result::Result<String, TemplateError>,
{
    if !template.contains('{') && !template.contains('}') {
        return Ok(template.to_string());
    }

    let mut rendered = String::with_capacity(template.len());
    for token in tokenize(template)? {
        match token {
            Token::Literal(text) => rendered.push_str(&text),
            Token::Placeholder(name) => rendered.push_str(&lookup(name)?),
        }
    }
    Ok(rendered)
}

/// Looks up a plain wildcard binding.
fn wildcard_value(wildcards: &Wildcards, name: &str) -> std::result::Result<String, TemplateError> {
    wildcards
        .get(name)
        .cloned()
        .ok_or_else(|| TemplateError::Unbound(name.to_string()))
}

/// Expands one input/output declaration with wildcard bindings only.
fn expand_path_template(rule: &str, template: &PathTemplate, wildcards: &Wildcards) -> Result<PathValue> {
    let render = |t: &str| {
        format_template(t, |name| wildcard_value(wildcards, name))
            .map(PathBuf::from)
            .map_err(|e| e.into_rule_error(rule, t))
    };

    match template {
        PathTemplate::Single(t) => render(t).map(PathValue::Single),
        PathTemplate::Many(ts) => ts
            .iter()
            .map(|t| render(t))
            .collect::<Result<Vec<_>>>()
            .map(PathValue::Many),
    }
}

/// Expands a rule's named input or output templates.
///
/// Names and declaration order are preserved.
pub fn expand_io(
    rule: &str,
    templates: &IndexMap<String, PathTemplate>,
    wildcards: &Wildcards,
) -> Result<IoMap> {
    let mut expanded = IoMap::with_capacity(templates.len());
    for (name, template) in templates {
        let value = expand_path_template(rule, template, wildcards)?;
        debug!("Rule '{}': {} -> {:?}", rule, name, value);
        expanded.insert(name.clone(), value);
    }
    Ok(expanded)
}

/// Everything a params template may reference.
struct ParamContext<'a> {
    wildcards: &'a Wildcards,
    input: &'a IoMap,
    output: &'a IoMap,
    rule: &'a Rule,
}

impl ParamContext<'_> {
    fn lookup(&self, key: &str) -> std::result::Result<String, TemplateError> {
        let unknown = || TemplateError::Unknown(key.to_string());

        match key.split_once('.') {
            None => match key {
                "input" => Ok(join_all(self.input)),
                "output" => Ok(join_all(self.output)),
                "threads" => Ok(self.rule.threads.to_string()),
                name => wildcard_value(self.wildcards, name),
            },
            Some(("wildcards", name)) => wildcard_value(self.wildcards, name),
            Some(("input", name)) => self
                .input
                .get(name)
                .map(PathValue::display_joined)
                .ok_or_else(unknown),
            Some(("output", name)) => self
                .output
                .get(name)
                .map(PathValue::display_joined)
                .ok_or_else(unknown),
            Some(("resources", name)) => self
                .rule
                .resources
                .get(name)
                .and_then(scalar_to_string)
                .ok_or_else(unknown),
            Some(_) => Err(unknown()),
        }
    }

    fn expand_value(&self, value: &Value) -> std::result::Result<Value, (TemplateError, String)> {
        match value {
            Value::String(s) => format_template(s, |key| self.lookup(key))
                .map(Value::String)
                .map_err(|e| (e, s.clone())),
            Value::Sequence(items) => items
                .iter()
                .map(|item| self.expand_value(item))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Value::Sequence),
            Value::Mapping(map) => {
                let mut expanded = Mapping::with_capacity(map.len());
                for (k, v) in map {
                    expanded.insert(k.clone(), self.expand_value(v)?);
                }
                Ok(Value::Mapping(expanded))
            }
            Value::Tagged(tagged) => Ok(Value::Tagged(Box::new(TaggedValue {
                tag: tagged.tag.clone(),
                value: self.expand_value(&tagged.value)?,
            }))),
            other => Ok(other.clone()),
        }
    }
}

fn join_all(io: &IoMap) -> String {
    io.values()
        .map(PathValue::display_joined)
        .collect::<Vec<_>>()
        .join(" ")
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Expands a rule's params against wildcards, the expanded input and
/// output, and the rule's resources and threads.
pub fn expand_params(rule: &Rule, wildcards: &Wildcards, input: &IoMap, output: &IoMap) -> Result<Params> {
    let ctx = ParamContext {
        wildcards,
        input,
        output,
        rule,
    };

    let mut expanded = Params::with_capacity(rule.params.len());
    for (name, value) in &rule.params {
        let value = ctx
            .expand_value(value)
            .map_err(|(e, template)| e.into_rule_error(&rule.name, &template))?;
        expanded.insert(name.clone(), value);
    }

    debug!("Rule '{}': expanded {} params", rule.name, expanded.len());
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(pairs: &[(&str, &str)]) -> Wildcards {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_extract_wildcard_names() {
        let names = extract_wildcard_names("reads/{sample}.fastq");
        assert_eq!(names, vec!["sample"]);

        let names = extract_wildcard_names("{id}_{replicate}.txt");
        assert_eq!(names, vec!["id", "replicate"]);
    }

    #[test]
    fn test_extract_wildcard_names_malformed() {
        assert!(extract_wildcard_names("reads/{sample.fastq").is_empty());
    }

    #[test]
    fn test_format_template_escapes_and_constraints() {
        let wc = bindings(&[("id", "007")]);
        let out = format_template("{{raw}}/{id,\\d{3}}.txt", |n| wildcard_value(&wc, n));
        assert_eq!(out, Ok("{raw}/007.txt".to_string()));
    }

    #[test]
    fn test_format_template_errors() {
        let wc = Wildcards::new();
        assert_eq!(
            format_template("{sample}.txt", |n| wildcard_value(&wc, n)),
            Err(TemplateError::Unbound("sample".to_string()))
        );
        assert!(matches!(
            format_template("{sample.txt", |n| wildcard_value(&wc, n)),
            Err(TemplateError::Malformed(_))
        ));
        assert!(matches!(
            format_template("a}b{c}", |n| wildcard_value(&wc, n)),
            Err(TemplateError::Malformed(_))
        ));
        assert!(matches!(
            format_template("{}", |n| wildcard_value(&wc, n)),
            Err(TemplateError::Malformed(_))
        ));
    }

    #[test]
    fn test_expand_io_preserves_shape() {
        let rule = Rule::new("r")
            .with_output("out", "results/{sample}/out.txt")
            .with_outputs(
                "logs",
                vec!["logs/{sample}.1.log".to_string(), "logs/{sample}.2.log".to_string()],
            );

        let out = expand_io("r", &rule.output, &bindings(&[("sample", "A")])).unwrap();

        assert_eq!(
            out["out"],
            PathValue::Single(PathBuf::from("results/A/out.txt"))
        );
        assert_eq!(
            out["logs"],
            PathValue::Many(vec![
                PathBuf::from("logs/A.1.log"),
                PathBuf::from("logs/A.2.log")
            ])
        );
        assert_eq!(out.keys().collect::<Vec<_>>(), vec!["out", "logs"]);
    }

    #[test]
    fn test_expand_io_missing_wildcard() {
        let rule = Rule::new("r").with_output("out", "results/{sample}/out.txt");
        let err = expand_io("r", &rule.output, &Wildcards::new()).unwrap_err();

        match err {
            RuleArgsError::MissingWildcard { rule, wildcard } => {
                assert_eq!(rule, "r");
                assert_eq!(wildcard, "sample");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_expand_params_references() {
        let rule = Rule::new("align")
            .with_param("prefix", "aligned/{sample}")
            .with_param("cmd", "-i {input.reads} -o {output} -t {threads} -m {resources.mem_mb}")
            .with_param("sample", "{wildcards.sample}")
            .with_param("level", 3)
            .with_resource("mem_mb", 4000)
            .with_threads(8);
        let wc = bindings(&[("sample", "A")]);

        let mut input = IoMap::new();
        input.insert("reads".into(), PathValue::Single("reads/A.fq".into()));
        let mut output = IoMap::new();
        output.insert(
            "bam".into(),
            PathValue::Many(vec!["A.bam".into(), "A.bai".into()]),
        );

        let params = expand_params(&rule, &wc, &input, &output).unwrap();

        assert_eq!(params["prefix"], Value::from("aligned/A"));
        assert_eq!(
            params["cmd"],
            Value::from("-i reads/A.fq -o A.bam A.bai -t 8 -m 4000")
        );
        assert_eq!(params["sample"], Value::from("A"));
        assert_eq!(params["level"], Value::from(3));
    }

    #[test]
    fn test_expand_params_nested_values() {
        let nested: Value = serde_yaml::from_str("[\"{sample}.a\", {key: \"{sample}.b\", n: 1}]").unwrap();
        let rule = Rule::new("r").with_param("nested", nested);

        let params = expand_params(
            &rule,
            &bindings(&[("sample", "S")]),
            &IoMap::new(),
            &IoMap::new(),
        )
        .unwrap();

        let expected: Value = serde_yaml::from_str("[S.a, {key: S.b, n: 1}]").unwrap();
        assert_eq!(params["nested"], expected);
    }

    #[test]
    fn test_expand_params_unknown_reference() {
        let rule = Rule::new("r").with_param("p", "{input.missing}");
        let err = expand_params(&rule, &Wildcards::new(), &IoMap::new(), &IoMap::new()).unwrap_err();

        assert!(matches!(err, RuleArgsError::InvalidTemplate { .. }));
        assert!(err.to_string().contains("input.missing"));
    }

    #[test]
    fn test_expand_params_missing_wildcard() {
        let rule = Rule::new("r").with_param("p", "{wildcards.sample}");
        let err = expand_params(&rule, &Wildcards::new(), &IoMap::new(), &IoMap::new()).unwrap_err();
        assert!(err.is_missing_wildcard());
    }
}
