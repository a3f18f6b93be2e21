// wcf-core/src/ports/factory.rs

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::domain::error::DomainError;
use crate::domain::schema::Schema;
use crate::ports::connector::Connector;
use crate::ports::exporter::Exporter;
use crate::ports::processor::{InputRequirement, Processor};
use crate::ports::service::ServiceContainer;

/// Constructs [`Connector`] instances for one `type:` value in a runbook's
/// `source` block.
pub trait ConnectorFactory: Send + Sync {
    fn get_component_name(&self) -> &str;

    fn can_create(&self, config: &HashMap<String, Value>) -> bool;

    fn create(
        &self,
        config: &HashMap<String, Value>,
        services: &ServiceContainer,
    ) -> Result<Arc<dyn Connector>, DomainError>;

    fn get_output_schemas(&self) -> Vec<Schema>;

    /// Names and type identifiers of services this factory's components need
    /// from the [`ServiceContainer`] at construction time.
    fn get_service_dependencies(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}

/// Constructs [`Processor`] instances (analysers and classifiers alike) for one
/// `type:` value in a runbook's `process` block.
pub trait ProcessorFactory: Send + Sync {
    fn get_component_name(&self) -> &str;

    fn can_create(&self, config: &HashMap<String, Value>) -> bool;

    fn create(
        &self,
        config: &HashMap<String, Value>,
        services: &ServiceContainer,
    ) -> Result<Arc<dyn Processor>, DomainError>;

    fn get_input_requirements(&self) -> Vec<InputRequirement>;

    fn get_output_schemas(&self) -> Vec<Schema>;

    fn get_service_dependencies(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}

/// Constructs [`Exporter`] instances for the CLI's `--exporter NAME` flag.
pub trait ExporterFactory: Send + Sync {
    fn get_component_name(&self) -> &str;

    fn can_create(&self, config: &HashMap<String, Value>) -> bool;

    fn create(
        &self,
        config: &HashMap<String, Value>,
        services: &ServiceContainer,
    ) -> Result<Arc<dyn Exporter>, DomainError>;

    fn get_service_dependencies(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}
