// wcf-core/src/domain/registry.rs

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::domain::error::DomainError;
use crate::ports::factory::{ConnectorFactory, ExporterFactory, ProcessorFactory};

/// Three disjoint maps of component factories, keyed by the `type:` string a
/// runbook document names. Populated entirely by explicit registration calls at
/// startup (see `wcf::registration` for the CLI's static-array wiring); the core
/// itself never discovers factories dynamically.
#[derive(Default)]
pub struct ComponentRegistry {
    connectors: HashMap<String, Arc<dyn ConnectorFactory>>,
    processors: HashMap<String, Arc<dyn ProcessorFactory>>,
    exporters: HashMap<String, Arc<dyn ExporterFactory>>,
    /// Names of known rulesets. Ruleset *content* is out of scope for the core;
    /// this only lets `ls-rulesets` and `RulesetNotFoundError` function.
    rulesets: Vec<String>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_connector(&mut self, factory: Arc<dyn ConnectorFactory>) {
        let name = factory.get_component_name().to_string();
        debug!(component = %name, kind = "connector", "registering factory");
        self.connectors.insert(name, factory);
    }

    pub fn register_processor(&mut self, factory: Arc<dyn ProcessorFactory>) {
        let name = factory.get_component_name().to_string();
        debug!(component = %name, kind = "processor", "registering factory");
        self.processors.insert(name, factory);
    }

    pub fn register_exporter(&mut self, factory: Arc<dyn ExporterFactory>) {
        let name = factory.get_component_name().to_string();
        debug!(component = %name, kind = "exporter", "registering factory");
        self.exporters.insert(name, factory);
    }

    pub fn register_ruleset(&mut self, name: impl Into<String>) {
        self.rulesets.push(name.into());
    }

    pub fn connector_factory(&self, component_type: &str) -> Result<Arc<dyn ConnectorFactory>, DomainError> {
        self.connectors
            .get(component_type)
            .cloned()
            .ok_or_else(|| DomainError::UnsupportedProviderError(format!("connector '{component_type}'")))
    }

    pub fn processor_factory(&self, component_type: &str) -> Result<Arc<dyn ProcessorFactory>, DomainError> {
        self.processors
            .get(component_type)
            .cloned()
            .ok_or_else(|| DomainError::UnsupportedProviderError(format!("processor '{component_type}'")))
    }

    pub fn exporter_factory(&self, component_type: &str) -> Result<Arc<dyn ExporterFactory>, DomainError> {
        self.exporters
            .get(component_type)
            .cloned()
            .ok_or_else(|| DomainError::UnsupportedProviderError(format!("exporter '{component_type}'")))
    }

    pub fn ruleset(&self, name: &str) -> Result<&str, DomainError> {
        self.rulesets
            .iter()
            .find(|r| r.as_str() == name)
            .map(String::as_str)
            .ok_or_else(|| DomainError::RulesetNotFoundError(name.to_string()))
    }

    pub fn list_connectors(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.connectors.keys().map(String::as_str).collect();
        names.sort();
        names
    }

    pub fn list_processors(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.processors.keys().map(String::as_str).collect();
        names.sort();
        names
    }

    pub fn list_exporters(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.exporters.keys().map(String::as_str).collect();
        names.sort();
        names
    }

    pub fn list_rulesets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rulesets.iter().map(String::as_str).collect();
        names.sort();
        names
    }
}
