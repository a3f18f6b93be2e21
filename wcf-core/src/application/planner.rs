// wcf-core/src/application/planner.rs

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::domain::error::DomainError;
use crate::domain::graph::Dag;
use crate::domain::plan::{ArtifactSchemas, ExecutionPlan};
use crate::domain::registry::ComponentRegistry;
use crate::domain::runbook::Runbook;
use crate::domain::schema::Schema;

/// Resolves a flattened runbook into an immutable [`ExecutionPlan`]: builds the
/// dependency graph, infers every artifact's input/output schemas, checks
/// factory compatibility, computes topological layers, and marks artifacts
/// pre-skipped by `execute: false`.
pub struct Planner<'a> {
    registry: &'a ComponentRegistry,
}

impl<'a> Planner<'a> {
    pub fn new(registry: &'a ComponentRegistry) -> Self {
        Self { registry }
    }

    #[instrument(skip_all, fields(runbook = %runbook.name))]
    pub fn plan(&self, runbook: Runbook) -> Result<ExecutionPlan, DomainError> {
        let dag = Dag::build(&runbook)?;

        let mut artifact_schemas = HashMap::new();
        // Schema inference walks artifacts in topological order so a processed
        // artifact's inputs are already resolved when it is reached.
        let layers = dag.layers()?;
        for layer in &layers {
            for id in layer {
                let artifact = &runbook.artifacts[id];
                let schemas = self.infer_schemas(id, artifact, &dag, &artifact_schemas)?;
                debug!(artifact = %id, output = %schemas.output_schema, "inferred schemas");
                artifact_schemas.insert(id.clone(), schemas);
            }
        }

        let pre_skipped = self.pre_skip_analysis(&runbook, &dag, &layers);

        Ok(ExecutionPlan { runbook, dag, artifact_schemas, pre_skipped })
    }

    fn infer_schemas(
        &self,
        id: &str,
        artifact: &crate::domain::runbook::Artifact,
        dag: &Dag,
        resolved: &HashMap<String, ArtifactSchemas>,
    ) -> Result<ArtifactSchemas, DomainError> {
        if let Some(source) = &artifact.source {
            let factory = self.registry.connector_factory(&source.component_type)?;
            if !factory.can_create(&source.config) {
                return Err(DomainError::ConnectorConfigError(format!(
                    "artifact '{id}': connector '{}' rejected its configuration",
                    source.component_type
                )));
            }
            let output_schema = self.resolve_output_schema(artifact, factory.get_output_schemas())?;
            return Ok(ArtifactSchemas { input_schemas: Vec::new(), output_schema });
        }

        if let Some(process) = &artifact.process {
            let factory = self.registry.processor_factory(&process.component_type)?;
            if !factory.can_create(&process.config) {
                return Err(DomainError::AnalyserError(format!(
                    "artifact '{id}': processor '{}' rejected its configuration",
                    process.component_type
                )));
            }

            let input_schemas: Vec<Schema> = dag
                .predecessors(id)
                .iter()
                .map(|pred| resolved[pred].output_schema.clone())
                .collect();

            self.check_input_compatibility(id, &factory.get_input_requirements(), &input_schemas)?;

            let output_schema = self.resolve_output_schema(artifact, factory.get_output_schemas())?;
            return Ok(ArtifactSchemas { input_schemas, output_schema });
        }

        Err(DomainError::RunbookValidationError(format!(
            "artifact '{id}' is neither a source nor a processed artifact at plan time (child runbooks must be flattened first)"
        )))
    }

    fn resolve_output_schema(
        &self,
        artifact: &crate::domain::runbook::Artifact,
        factory_schemas: Vec<Schema>,
    ) -> Result<Schema, DomainError> {
        if let Some(schema_ref) = &artifact.output_schema {
            return schema_ref.resolve();
        }
        factory_schemas.into_iter().next().ok_or_else(|| {
            DomainError::SchemaNotFoundError(format!(
                "artifact '{}': factory advertises no output schemas and none was declared explicitly",
                artifact.id
            ))
        })
    }

    /// At least one declared alternative combination must match the resolved
    /// input schemas by name+version, in the order the factory declares.
    fn check_input_compatibility(
        &self,
        id: &str,
        requirements: &[Vec<Schema>],
        input_schemas: &[Schema],
    ) -> Result<(), DomainError> {
        if requirements.is_empty() {
            return Ok(());
        }
        let matches = requirements.iter().any(|alternative| alternative.as_slice() == input_schemas);
        if matches {
            return Ok(());
        }
        Err(DomainError::SchemaCompatibilityError(format!(
            "artifact '{id}': inputs {:?} match none of the processor's declared requirement alternatives {:?}",
            input_schemas.iter().map(Schema::to_string).collect::<Vec<_>>(),
            requirements
                .iter()
                .map(|alt| alt.iter().map(Schema::to_string).collect::<Vec<_>>())
                .collect::<Vec<_>>()
        )))
    }

    /// Marks `execute: false` artifacts and propagates the pre-skip to transitive
    /// dependents, unless a dependent is `optional` (which merely absorbs the
    /// skip rather than being forced into it — the executor still decides its
    /// own fate based on its predecessors' final status).
    fn pre_skip_analysis(&self, runbook: &Runbook, dag: &Dag, layers: &[Vec<String>]) -> Vec<String> {
        let mut pre_skipped: std::collections::HashSet<String> = runbook
            .artifacts
            .iter()
            .filter(|(_, a)| !a.execute)
            .map(|(id, _)| id.clone())
            .collect();

        for layer in layers {
            for id in layer {
                if pre_skipped.contains(id) {
                    continue;
                }
                let artifact = &runbook.artifacts[id];
                if artifact.optional {
                    continue;
                }
                if dag.predecessors(id).iter().any(|p| pre_skipped.contains(p)) {
                    pre_skipped.insert(id.clone());
                }
            }
        }

        let mut result: Vec<String> = pre_skipped.into_iter().collect();
        result.sort();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::runbook::{Artifact, InputRef, ProcessConfig, SourceConfig};
    use std::collections::HashMap;
    use std::sync::Arc;

    use crate::ports::connector::Connector;
    use crate::ports::factory::ConnectorFactory;
    use crate::ports::service::ServiceContainer;
    use async_trait::async_trait;

    struct FsConnector;
    #[async_trait]
    impl Connector for FsConnector {
        fn get_name(&self) -> &str { "fs" }
        fn get_supported_output_schemas(&self) -> Vec<Schema> { vec![Schema::new("standard_input", "1.0.0")] }
        async fn extract(&self, output_schema: &Schema) -> Result<crate::domain::schema::Message, DomainError> {
            Ok(crate::domain::schema::Message::new("m", serde_json::json!({}), output_schema.clone()))
        }
    }

    struct FsConnectorFactory;
    impl ConnectorFactory for FsConnectorFactory {
        fn get_component_name(&self) -> &str { "fs" }
        fn can_create(&self, _config: &HashMap<String, serde_json::Value>) -> bool { true }
        fn create(&self, _config: &HashMap<String, serde_json::Value>, _services: &ServiceContainer) -> Result<Arc<dyn Connector>, DomainError> {
            Ok(Arc::new(FsConnector))
        }
        fn get_output_schemas(&self) -> Vec<Schema> { vec![Schema::new("standard_input", "1.0.0")] }
    }

    fn source_artifact(id: &str) -> Artifact {
        Artifact {
            id: id.to_string(),
            source: Some(SourceConfig { component_type: "fs".into(), config: HashMap::new() }),
            process: None,
            child_runbook: None,
            inputs: None,
            merge: None,
            output_schema: None,
            output: true,
            optional: false,
            execute: true,
            name: None,
            description: None,
            contact: None,
        }
    }

    fn registry_with_fs() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry.register_connector(Arc::new(FsConnectorFactory));
        registry
    }

    #[test]
    fn plans_single_source_artifact() {
        let registry = registry_with_fs();
        let rb = Runbook {
            name: "t".into(),
            description: "t".into(),
            contact: None,
            inputs: HashMap::new(),
            outputs: HashMap::new(),
            artifacts: HashMap::from([("src".to_string(), source_artifact("src"))]),
            config: Default::default(),
        };
        let plan = Planner::new(&registry).plan(rb).unwrap();
        let schemas = plan.schemas_for("src").unwrap();
        assert_eq!(schemas.output_schema, Schema::new("standard_input", "1.0.0"));
        assert_eq!(plan.layers().unwrap(), vec![vec!["src".to_string()]]);
    }

    #[test]
    fn unknown_connector_type_fails_planning() {
        let registry = ComponentRegistry::new();
        let rb = Runbook {
            name: "t".into(),
            description: "t".into(),
            contact: None,
            inputs: HashMap::new(),
            outputs: HashMap::new(),
            artifacts: HashMap::from([("src".to_string(), source_artifact("src"))]),
            config: Default::default(),
        };
        let err = Planner::new(&registry).plan(rb).unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedProviderError(_)));
    }

    #[test]
    fn pre_skip_propagates_to_non_optional_dependents() {
        let registry = registry_with_fs();
        let mut src = source_artifact("src");
        src.execute = false;
        let downstream = Artifact {
            id: "downstream".into(),
            source: None,
            process: Some(ProcessConfig { component_type: "noop".into(), config: HashMap::new() }),
            child_runbook: None,
            inputs: Some(InputRef::One("src".into())),
            merge: None,
            output_schema: Some(crate::domain::runbook::SchemaRef("out/1.0.0".into())),
            output: true,
            optional: false,
            execute: true,
            name: None,
            description: None,
            contact: None,
        };

        let dag = Dag::build(&Runbook {
            name: "t".into(),
            description: "t".into(),
            contact: None,
            inputs: HashMap::new(),
            outputs: HashMap::new(),
            artifacts: HashMap::from([("src".to_string(), src.clone()), ("downstream".to_string(), downstream.clone())]),
            config: Default::default(),
        })
        .unwrap();
        let layers = dag.layers().unwrap();

        let rb = Runbook {
            name: "t".into(),
            description: "t".into(),
            contact: None,
            inputs: HashMap::new(),
            outputs: HashMap::new(),
            artifacts: HashMap::from([("src".to_string(), src), ("downstream".to_string(), downstream)]),
            config: Default::default(),
        };
        let planner = Planner::new(&registry);
        let pre_skipped = planner.pre_skip_analysis(&rb, &dag, &layers);
        assert_eq!(pre_skipped, vec!["downstream".to_string(), "src".to_string()]);
    }
}
