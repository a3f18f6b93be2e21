// wcf-core/src/domain/plan.rs

use std::collections::HashMap;

use crate::domain::graph::Dag;
use crate::domain::runbook::Runbook;
use crate::domain::schema::Schema;

/// An artifact's inferred input/output schemas, as resolved by the planner.
/// `input_schemas` is empty for source artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactSchemas {
    pub input_schemas: Vec<Schema>,
    pub output_schema: Schema,
}

/// The immutable output of the planner: a flattened runbook paired with its
/// resolved dependency graph and per-artifact schema bindings. Consumed only by
/// the executor; nothing downstream may mutate it.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pub runbook: Runbook,
    pub dag: Dag,
    pub artifact_schemas: HashMap<String, ArtifactSchemas>,
    /// Artifacts pre-skipped by `execute=false` (not upstream propagation), as
    /// computed by the planner's pre-skip analysis.
    pub pre_skipped: Vec<String>,
}

impl ExecutionPlan {
    pub fn layers(&self) -> Result<Vec<Vec<String>>, crate::domain::error::DomainError> {
        self.dag.layers()
    }

    pub fn schemas_for(&self, artifact_id: &str) -> Option<&ArtifactSchemas> {
        self.artifact_schemas.get(artifact_id)
    }
}
