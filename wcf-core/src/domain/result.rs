// wcf-core/src/domain/result.rs

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::runbook::Runbook;
use crate::domain::schema::Message;

/// Outcome of a single artifact's execution (or skip).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactResult {
    pub artifact_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_seconds: f64,
}

impl ArtifactResult {
    pub fn success(artifact_id: impl Into<String>, message: Message, duration_seconds: f64) -> Self {
        Self {
            artifact_id: artifact_id.into(),
            success: true,
            message: Some(message),
            error: None,
            duration_seconds,
        }
    }

    pub fn failure(artifact_id: impl Into<String>, error: impl Into<String>, duration_seconds: f64) -> Self {
        Self {
            artifact_id: artifact_id.into(),
            success: false,
            message: None,
            error: Some(error.into()),
            duration_seconds,
        }
    }

    /// A skipped artifact: not a failure (`success` stays conventionally `false`,
    /// but callers must consult the run's `skipped` set to distinguish a skip from
    /// a genuine failure — `ArtifactResult` alone cannot).
    pub fn skipped(artifact_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            artifact_id: artifact_id.into(),
            success: false,
            message: None,
            error: Some(reason.into()),
            duration_seconds: 0.0,
        }
    }
}

/// Overall disposition of a completed run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed,
    Partial,
}

impl RunStatus {
    /// Derives status from the completed artifact results and skip set, per the
    /// executor's status-derivation rule: `failed` if any non-optional artifact
    /// failed, else `partial` if anything was skipped (or an optional artifact
    /// failed), else `completed`. `is_optional` reports whether a given artifact
    /// id was declared `optional: true` in the runbook the results came from.
    pub fn derive(
        artifacts: &HashMap<String, ArtifactResult>,
        skipped: &BTreeSet<String>,
        is_optional: impl Fn(&str) -> bool,
    ) -> Self {
        let any_failed = artifacts
            .values()
            .any(|r| !r.success && !skipped.contains(&r.artifact_id) && !is_optional(&r.artifact_id));
        if any_failed {
            return RunStatus::Failed;
        }
        let any_skipped_or_optional_failure = !skipped.is_empty()
            || artifacts
                .values()
                .any(|r| !r.success && !skipped.contains(&r.artifact_id));
        if any_skipped_or_optional_failure {
            return RunStatus::Partial;
        }
        RunStatus::Completed
    }
}

/// The complete record of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub run_id: Uuid,
    pub start_timestamp: DateTime<Utc>,
    pub artifacts: HashMap<String, ArtifactResult>,
    pub skipped: BTreeSet<String>,
    pub total_duration_seconds: f64,
    /// Set once the run observed its cancellation token tripped. A cancelled
    /// run is always `failed`, regardless of what its artifacts/skips alone
    /// would derive to — cancellation is a run-level fatal condition, not a
    /// per-artifact outcome.
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub cancelled: bool,
}

impl ExecutionResult {
    pub fn new(start_timestamp: DateTime<Utc>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            start_timestamp,
            artifacts: HashMap::new(),
            skipped: BTreeSet::new(),
            total_duration_seconds: 0.0,
            cancelled: false,
        }
    }

    pub fn status(&self, runbook: &Runbook) -> RunStatus {
        if self.cancelled {
            return RunStatus::Failed;
        }
        RunStatus::derive(&self.artifacts, &self.skipped, |id| {
            runbook.artifacts.get(id).is_some_and(|a| a.optional)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_completed_when_all_succeed() {
        let mut artifacts = HashMap::new();
        artifacts.insert("a".to_string(), ArtifactResult { artifact_id: "a".into(), success: true, message: None, error: None, duration_seconds: 0.1 });
        assert_eq!(RunStatus::derive(&artifacts, &BTreeSet::new(), |_| false), RunStatus::Completed);
    }

    #[test]
    fn status_partial_when_something_skipped_but_nothing_failed() {
        let mut artifacts = HashMap::new();
        artifacts.insert("a".to_string(), ArtifactResult { artifact_id: "a".into(), success: true, message: None, error: None, duration_seconds: 0.1 });
        let mut skipped = BTreeSet::new();
        skipped.insert("b".to_string());
        artifacts.insert("b".to_string(), ArtifactResult::skipped("b", "upstream failed"));
        assert_eq!(RunStatus::derive(&artifacts, &skipped, |_| false), RunStatus::Partial);
    }

    #[test]
    fn status_failed_when_a_non_skipped_non_optional_artifact_fails() {
        let mut artifacts = HashMap::new();
        artifacts.insert("a".to_string(), ArtifactResult::failure("a", "boom", 0.1));
        assert_eq!(RunStatus::derive(&artifacts, &BTreeSet::new(), |_| false), RunStatus::Failed);
    }

    #[test]
    fn status_failed_when_run_was_cancelled_even_with_no_other_failures() {
        let mut result = ExecutionResult::new(Utc::now());
        result.cancelled = true;
        result.artifacts.insert(
            "a".to_string(),
            ArtifactResult { artifact_id: "a".into(), success: true, message: None, error: None, duration_seconds: 0.1 },
        );
        let runbook = Runbook {
            name: "t".into(),
            description: "t".into(),
            contact: None,
            inputs: HashMap::new(),
            outputs: HashMap::new(),
            artifacts: HashMap::new(),
            config: Default::default(),
        };
        assert_eq!(result.status(&runbook), RunStatus::Failed);
    }

    #[test]
    fn status_partial_when_only_an_optional_artifact_fails() {
        let mut artifacts = HashMap::new();
        artifacts.insert("a".to_string(), ArtifactResult { artifact_id: "a".into(), success: true, message: None, error: None, duration_seconds: 0.1 });
        artifacts.insert("opt".to_string(), ArtifactResult::failure("opt", "boom", 0.1));
        assert_eq!(
            RunStatus::derive(&artifacts, &BTreeSet::new(), |id| id == "opt"),
            RunStatus::Partial
        );
    }
}
