// wcf-core/src/ports/mod.rs

pub mod connector;
pub mod exporter;
pub mod factory;
pub mod processor;
pub mod service;

pub use connector::Connector;
pub use exporter::Exporter;
pub use factory::{ConnectorFactory, ExporterFactory, ProcessorFactory};
pub use processor::{Classifier, InputRequirement, Processor};
pub use service::ServiceContainer;
