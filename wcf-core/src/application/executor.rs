// wcf-core/src/application/executor.rs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::domain::error::DomainError;
use crate::domain::plan::ExecutionPlan;
use crate::domain::registry::ComponentRegistry;
use crate::domain::result::{ArtifactResult, ExecutionResult};
use crate::domain::runbook::{Artifact, MergePolicy};
use crate::domain::schema::Message;
use crate::ports::service::ServiceContainer;

const DEFAULT_CONCURRENCY: usize = 4;

/// A run-level cancellation flag. Cloning shares the same underlying signal;
/// [`Self::cancel`] is idempotent and visible to every clone immediately.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs a resolved [`ExecutionPlan`] layer by layer, with a bounded worker pool
/// inside each layer and a synchronisation barrier between layers.
pub struct Executor<'a> {
    registry: &'a ComponentRegistry,
    services: &'a ServiceContainer,
    concurrency: usize,
}

impl<'a> Executor<'a> {
    pub fn new(registry: &'a ComponentRegistry, services: &'a ServiceContainer) -> Self {
        Self {
            registry,
            services,
            concurrency: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(DEFAULT_CONCURRENCY),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    #[instrument(skip_all, fields(runbook = %plan.runbook.name))]
    pub async fn execute(&self, plan: &ExecutionPlan, cancel: CancellationToken) -> Result<ExecutionResult, DomainError> {
        let run_start = Instant::now();
        let mut result = ExecutionResult::new(Utc::now());

        for id in &plan.pre_skipped {
            info!(artifact = %id, "pre-skipped (execute=false)");
            result.skipped.insert(id.clone());
            result.artifacts.insert(id.clone(), ArtifactResult::skipped(id, "execute=false"));
        }

        let layers = plan.layers()?;

        for (layer_index, layer) in layers.iter().enumerate() {
            if cancel.is_cancelled() {
                result.cancelled = true;
                self.skip_remaining(&layers[layer_index..], &mut result, "cancelled");
                break;
            }

            let pending: Vec<&String> = layer.iter().filter(|id| !result.artifacts.contains_key(*id)).collect();
            debug!(layer = layer_index, artifacts = pending.len(), "starting layer");

            // `result` must stay untouched while the stream below is alive: its
            // futures borrow it immutably to inspect earlier layers' outcomes.
            // Outcomes are buffered here and merged in once the stream (and with
            // it, that borrow) is dropped.
            let mut layer_outcomes = Vec::with_capacity(pending.len());
            {
                let tasks = pending.into_iter().map(|id| {
                    let artifact = &plan.runbook.artifacts[id];
                    self.run_artifact(id, artifact, plan, &result, &cancel)
                });
                let mut stream = stream::iter(tasks).buffer_unordered(self.concurrency);
                while let Some(outcome) = stream.next().await {
                    layer_outcomes.push(outcome);
                }
            }

            for (id, outcome) in layer_outcomes {
                match outcome {
                    ArtifactOutcome::Success(artifact_result) => {
                        info!(artifact = %id, duration = artifact_result.duration_seconds, "artifact succeeded");
                        result.artifacts.insert(id, artifact_result);
                    }
                    ArtifactOutcome::Failure(artifact_result) => {
                        warn!(artifact = %id, error = ?artifact_result.error, "artifact failed");
                        result.artifacts.insert(id, artifact_result);
                    }
                    ArtifactOutcome::Skipped(reason) => {
                        debug!(artifact = %id, %reason, "artifact skipped");
                        if reason == "cancelled" {
                            result.cancelled = true;
                        }
                        result.skipped.insert(id.clone());
                        result.artifacts.insert(id.clone(), ArtifactResult::skipped(&id, reason));
                    }
                }
            }
        }

        result.total_duration_seconds = run_start.elapsed().as_secs_f64();
        Ok(result)
    }

    fn skip_remaining(&self, layers: &[Vec<String>], result: &mut ExecutionResult, reason: &str) {
        for layer in layers {
            for id in layer {
                if result.artifacts.contains_key(id) {
                    continue;
                }
                result.skipped.insert(id.clone());
                result.artifacts.insert(id.clone(), ArtifactResult::skipped(id, reason));
            }
        }
    }

    async fn run_artifact(
        &self,
        id: &str,
        artifact: &Artifact,
        plan: &ExecutionPlan,
        result: &ExecutionResult,
        cancel: &CancellationToken,
    ) -> (String, ArtifactOutcome) {
        if cancel.is_cancelled() {
            return (id.to_string(), ArtifactOutcome::Skipped("cancelled".to_string()));
        }

        if let Some(skip_reason) = self.predecessor_skip_reason(id, artifact, plan, result) {
            return (id.to_string(), ArtifactOutcome::Skipped(skip_reason));
        }

        let start = Instant::now();
        match self.invoke(id, artifact, plan, result).await {
            // The connector/processor contract guarantees `message.schema` equals
            // the plan's resolved output schema for this artifact, so validating
            // against the message's own declared schema validates it against the
            // declared output schema.
            Ok(message) => match message.validate() {
                Ok(()) => (
                    id.to_string(),
                    ArtifactOutcome::Success(ArtifactResult::success(id, message, start.elapsed().as_secs_f64())),
                ),
                Err(e) => (
                    id.to_string(),
                    ArtifactOutcome::Failure(ArtifactResult::failure(id, e.to_string(), start.elapsed().as_secs_f64())),
                ),
            },
            Err(e) => (
                id.to_string(),
                ArtifactOutcome::Failure(ArtifactResult::failure(id, e.to_string(), start.elapsed().as_secs_f64())),
            ),
        }
    }

    /// Returns `Some(reason)` if `id` must be skipped because of a predecessor's
    /// final status, without invoking the component at all. An `optional`
    /// artifact absorbs an upstream failure or skip instead of propagating it —
    /// it still runs. A non-optional artifact skips if any predecessor skipped
    /// or failed; a skipped predecessor always propagates to a skip, never a
    /// promotion to failure.
    fn predecessor_skip_reason(
        &self,
        id: &str,
        artifact: &Artifact,
        plan: &ExecutionPlan,
        result: &ExecutionResult,
    ) -> Option<String> {
        for pred in plan.dag.predecessors(id) {
            if result.skipped.contains(pred) {
                if artifact.optional {
                    continue;
                }
                return Some(format!("upstream {pred} skipped"));
            }
            if let Some(pred_result) = result.artifacts.get(pred) {
                if !pred_result.success {
                    if artifact.optional {
                        continue;
                    }
                    return Some(format!("upstream {pred} failed"));
                }
            }
        }
        None
    }

    async fn invoke(
        &self,
        id: &str,
        artifact: &Artifact,
        plan: &ExecutionPlan,
        result: &ExecutionResult,
    ) -> Result<Message, DomainError> {
        let schemas = &plan.artifact_schemas[id];

        if let Some(source) = &artifact.source {
            let factory = self.registry.connector_factory(&source.component_type)?;
            let connector = factory.create(&source.config, self.services)?;
            return connector.extract(&schemas.output_schema).await;
        }

        let process = artifact
            .process
            .as_ref()
            .expect("planner guarantees every non-source artifact is processed at execute time");
        let factory = self.registry.processor_factory(&process.component_type)?;
        let processor = factory.create(&process.config, self.services)?;

        // A non-optional artifact never reaches this point with a skipped or
        // failed predecessor (`predecessor_skip_reason` would have skipped it
        // first). An `optional` artifact can, though: it absorbs the upstream
        // problem and still attempts to run, so a missing predecessor message
        // here becomes this artifact's own (tolerated) failure rather than a
        // panic.
        let mut predecessor_messages = Vec::new();
        for pred in plan.dag.predecessors(id) {
            let message = result.artifacts.get(pred).and_then(|r| r.message.clone()).ok_or_else(|| {
                DomainError::ExecutorError(format!(
                    "artifact '{id}': predecessor '{pred}' produced no message to consume"
                ))
            })?;
            predecessor_messages.push(message);
        }

        if predecessor_messages.len() == 1 {
            return processor
                .process(&schemas.input_schemas[0], &schemas.output_schema, predecessor_messages.into_iter().next().unwrap())
                .await;
        }

        let policy = artifact.merge.unwrap_or_else(|| {
            if processor.is_multi_input() {
                MergePolicy::List
            } else {
                MergePolicy::First
            }
        });

        match policy {
            MergePolicy::First => {
                let first = predecessor_messages.into_iter().next().expect("fan-in requires >=1 input");
                processor.process(&schemas.input_schemas[0], &schemas.output_schema, first).await
            }
            MergePolicy::Concat => {
                let merged = concat_messages(id, predecessor_messages)?;
                processor.process(&schemas.input_schemas[0], &schemas.output_schema, merged).await
            }
            MergePolicy::List => processor.process_many(predecessor_messages, &schemas.output_schema).await,
        }
    }
}

enum ArtifactOutcome {
    Success(ArtifactResult),
    Failure(ArtifactResult),
    Skipped(String),
}

/// Concatenates `data` arrays of same-schema messages into a single message. All
/// inputs must declare the same schema; the merged message keeps the first
/// input's schema and a freshly generated id.
fn concat_messages(artifact_id: &str, messages: Vec<Message>) -> Result<Message, DomainError> {
    let first_schema = messages[0].schema.clone();
    let mut merged = Vec::new();
    for message in &messages {
        if message.schema != first_schema {
            return Err(DomainError::SchemaCompatibilityError(format!(
                "artifact '{artifact_id}': concat merge requires all inputs to share a schema, found '{}' and '{first_schema}'",
                message.schema
            )));
        }
        let data = message.content.get("data").and_then(serde_json::Value::as_array).ok_or_else(|| {
            DomainError::SchemaCompatibilityError(format!(
                "artifact '{artifact_id}': concat merge requires each input's content to have a 'data' array"
            ))
        })?;
        merged.extend(data.iter().cloned());
    }
    Ok(Message::new(
        format!("{artifact_id}-merged"),
        serde_json::json!({ "data": merged }),
        first_schema,
    ))
}
