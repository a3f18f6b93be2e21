// wcf-core/src/ports/service.rs

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::error::DomainError;

/// A process-wide bag of named services (LLM clients, HTTP clients, database
/// pools) that factories may pull from during construction. Services are built
/// once at startup by the CLI harness and live until process exit; the core
/// never constructs or tears one down itself.
#[derive(Default, Clone)]
pub struct ServiceContainer {
    services: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: Any + Send + Sync>(&mut self, name: impl Into<String>, service: Arc<T>) {
        self.services.insert(name.into(), service);
    }

    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, DomainError> {
        let entry = self.services.get(name).ok_or_else(|| {
            DomainError::ConnectorConfigError(format!("service '{name}' was not registered"))
        })?;
        entry.clone().downcast::<T>().map_err(|_| {
            DomainError::ConnectorConfigError(format!(
                "service '{name}' was registered under a different type"
            ))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing(u32);

    #[test]
    fn registers_and_resolves_by_name_and_type() {
        let mut container = ServiceContainer::new();
        container.register("thing", Arc::new(Thing(42)));
        let resolved = container.get::<Thing>("thing").unwrap();
        assert_eq!(resolved.0, 42);
    }

    #[test]
    fn missing_service_is_a_config_error() {
        let container = ServiceContainer::new();
        assert!(container.get::<Thing>("missing").is_err());
    }
}
