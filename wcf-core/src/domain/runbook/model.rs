// wcf-core/src/domain/runbook/model.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// One or more upstream artifact ids. Runbook documents may write either a single
/// string or a list; both normalise to this type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum InputRef {
    One(String),
    Many(Vec<String>),
}

impl InputRef {
    pub fn as_slice(&self) -> Vec<&str> {
        match self {
            InputRef::One(id) => vec![id.as_str()],
            InputRef::Many(ids) => ids.iter().map(String::as_str).collect(),
        }
    }
}

/// Fan-in policy for a processed artifact with more than one input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    First,
    Concat,
    List,
}

/// Reference to a named, versioned schema document in the canonical
/// `"<name>/<version>"` textual form used by runbook documents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaRef(pub String);

impl SchemaRef {
    pub fn resolve(&self) -> Result<crate::domain::schema::Schema, DomainError> {
        crate::domain::schema::Schema::parse(&self.0).ok_or_else(|| {
            DomainError::RunbookValidationError(format!(
                "'{}' is not a valid schema reference (expected '<name>/<version>')",
                self.0
            ))
        })
    }
}

/// Connector configuration for a source artifact. `config` is passed verbatim to
/// the matching connector factory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(flatten)]
    pub config: HashMap<String, serde_json::Value>,
}

/// Processor configuration for a processed artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessConfig {
    #[serde(rename = "type")]
    pub component_type: String,
    #[serde(flatten)]
    pub config: HashMap<String, serde_json::Value>,
}

/// A nested-runbook composition directive. Expanded away by the flattener; never
/// seen by the planner or executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildRunbookConfig {
    pub path: String,
    #[serde(default)]
    pub input_mapping: HashMap<String, String>,
    /// Single-output shorthand for `output_mapping: { <alias>: <name> }` with one entry.
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub output_mapping: HashMap<String, String>,
}

impl ChildRunbookConfig {
    /// Normalises `output`/`output_mapping` into `{child_output_name: parent_alias}`.
    /// `output` is single-output shorthand and takes precedence over
    /// `output_mapping` when both are (incorrectly) present.
    pub fn output_names(&self, parent_artifact_id: &str) -> HashMap<String, String> {
        if let Some(output_name) = &self.output {
            let mut names = HashMap::new();
            names.insert(output_name.clone(), parent_artifact_id.to_string());
            return names;
        }
        self.output_mapping.clone()
    }
}

/// A node in the runbook graph: exactly one of `source`, `process`, `child_runbook`
/// is set, enforced by [`Artifact::validate`] after parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(skip)]
    pub id: String,

    #[serde(default)]
    pub source: Option<SourceConfig>,
    #[serde(default)]
    pub process: Option<ProcessConfig>,
    #[serde(default)]
    pub child_runbook: Option<ChildRunbookConfig>,

    #[serde(default)]
    pub inputs: Option<InputRef>,
    #[serde(default)]
    pub merge: Option<MergePolicy>,
    #[serde(default)]
    pub output_schema: Option<SchemaRef>,

    #[serde(default)]
    pub output: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default = "default_execute")]
    pub execute: bool,

    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
}

fn default_execute() -> bool {
    true
}

impl Artifact {
    pub fn input_ids(&self) -> Vec<&str> {
        self.inputs.as_ref().map(InputRef::as_slice).unwrap_or_default()
    }

    pub fn is_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn is_processed(&self) -> bool {
        self.process.is_some()
    }

    pub fn is_child_runbook(&self) -> bool {
        self.child_runbook.is_some()
    }

    /// Enforces the "exactly one of source/process/child_runbook" and
    /// "processed artifact has >=1 input" invariants from the data model.
    pub fn validate(&self) -> Result<(), DomainError> {
        let variants = [self.source.is_some(), self.process.is_some(), self.child_runbook.is_some()];
        let set_count = variants.iter().filter(|v| **v).count();
        if set_count != 1 {
            return Err(DomainError::RunbookValidationError(format!(
                "artifact '{}' must set exactly one of source, process, child_runbook (found {set_count})",
                self.id
            )));
        }
        if self.is_processed() && self.input_ids().is_empty() {
            return Err(DomainError::RunbookValidationError(format!(
                "processed artifact '{}' must declare at least one input",
                self.id
            )));
        }
        Ok(())
    }
}

/// Declared input the runbook expects a caller to supply (only meaningful for the
/// top-level runbook passed to a run; child runbooks' `inputs` are consumed and
/// resolved away by the flattener).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunbookInput {
    pub input_schema: String,
    #[serde(default)]
    pub optional: bool,
}

/// A parent-visible alias mapping to an internal artifact id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunbookOutput {
    pub artifact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunbookConfig {
    #[serde(default)]
    pub template_paths: Vec<String>,
}

/// The strongly-typed in-memory representation of a runbook document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Runbook {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub inputs: HashMap<String, RunbookInput>,
    #[serde(default)]
    pub outputs: HashMap<String, RunbookOutput>,
    pub artifacts: HashMap<String, Artifact>,
    #[serde(default)]
    pub config: RunbookConfig,
}

impl Runbook {
    /// Assigns each artifact's `id` from its map key (the map key is not carried on
    /// the struct by serde because downstream code needs it on the value itself)
    /// and validates every artifact's shape invariants, collecting all violations
    /// before returning (rather than failing on the first).
    pub fn finalize(mut self) -> Result<Self, DomainError> {
        let mut errors = Vec::new();
        for (id, artifact) in self.artifacts.iter_mut() {
            artifact.id = id.clone();
            if let Err(e) = artifact.validate() {
                errors.push(e.to_string());
            }
        }
        for (alias, output) in &self.outputs {
            if !self.artifacts.contains_key(&output.artifact) {
                errors.push(format!(
                    "output '{alias}' references unknown artifact '{}'",
                    output.artifact
                ));
            }
        }
        if !errors.is_empty() {
            return Err(DomainError::RunbookValidationError(errors.join("; ")));
        }
        Ok(self)
    }
}
