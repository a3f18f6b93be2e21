// wcf-core/src/application/export.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::DomainError;
use crate::domain::plan::ExecutionPlan;
use crate::domain::result::{ExecutionResult, RunStatus};
use crate::domain::schema::Schema;

const FORMAT_VERSION: &str = "2.0.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: uuid::Uuid,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub status: RunStatus,
    pub duration_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunbookSummary {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputEntry {
    pub artifact_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub output_schema: Schema,
    pub content: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub artifact_id: String,
    pub error: String,
}

/// The wire-format document a CLI run emits: a self-describing snapshot of one
/// completed execution, independent of the in-memory `ExecutionResult`/`ExecutionPlan`
/// it was built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreExport {
    pub format_version: String,
    pub run: RunSummary,
    pub runbook: RunbookSummary,
    pub summary: CountSummary,
    pub outputs: Vec<OutputEntry>,
    pub errors: Vec<ErrorEntry>,
    pub skipped: Vec<String>,
}

impl CoreExport {
    /// Builds the export document from a completed run and the plan that
    /// produced it. The two must correspond to the same run: every id that
    /// appears in `result.artifacts` is expected to also be a node of
    /// `plan.dag`.
    pub fn build(result: &ExecutionResult, plan: &ExecutionPlan) -> Result<Self, DomainError> {
        let layers = plan.layers()?;

        let mut outputs = Vec::new();
        for layer in &layers {
            for id in layer {
                let artifact = match plan.runbook.artifacts.get(id) {
                    Some(a) if a.output => a,
                    _ => continue,
                };
                let Some(artifact_result) = result.artifacts.get(id) else { continue };
                if !artifact_result.success {
                    continue;
                }
                let Some(message) = &artifact_result.message else { continue };
                outputs.push(OutputEntry {
                    artifact_id: id.clone(),
                    name: artifact.name.clone(),
                    description: artifact.description.clone(),
                    contact: artifact.contact.clone(),
                    output_schema: message.schema.clone(),
                    content: message.content.clone(),
                });
            }
        }

        let mut errors: Vec<ErrorEntry> = result
            .artifacts
            .values()
            .filter(|r| !r.success && !result.skipped.contains(&r.artifact_id))
            .map(|r| ErrorEntry {
                artifact_id: r.artifact_id.clone(),
                error: r.error.clone().unwrap_or_default(),
            })
            .collect();
        errors.sort_by(|a, b| a.artifact_id.cmp(&b.artifact_id));

        let skipped: Vec<String> = result.skipped.iter().cloned().collect();

        let succeeded = result
            .artifacts
            .values()
            .filter(|r| r.success && !result.skipped.contains(&r.artifact_id))
            .count();
        let failed = errors.len();

        Ok(CoreExport {
            format_version: FORMAT_VERSION.to_string(),
            run: RunSummary {
                id: result.run_id,
                timestamp: result.start_timestamp,
                status: result.status(&plan.runbook),
                duration_seconds: result.total_duration_seconds,
            },
            runbook: RunbookSummary {
                name: plan.runbook.name.clone(),
                description: plan.runbook.description.clone(),
                contact: plan.runbook.contact.clone(),
            },
            summary: CountSummary {
                total: result.artifacts.len(),
                succeeded,
                failed,
                skipped: skipped.len(),
            },
            outputs,
            errors,
            skipped,
        })
    }
}
