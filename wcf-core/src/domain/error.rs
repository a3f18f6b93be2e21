// wcf-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

/// Business-rule failures raised by the runbook model, the flattener, and the planner.
///
/// These never surface mid-run: every variant here is raised before any artifact
/// executes (parse/flatten/plan time), or is captured into an `ArtifactResult.error`
/// and never propagated further up the call stack.
#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Runbook validation failed: {0}")]
    #[diagnostic(
        code(wcf::domain::runbook_validation),
        help("Check the runbook document against the required artifact fields.")
    )]
    RunbookValidationError(String),

    #[error("Circular runbook reference detected: {0}")]
    #[diagnostic(
        code(wcf::domain::circular_runbook),
        help("A child runbook directive forms a cycle through its own ancestors.")
    )]
    CircularRunbookError(String),

    #[error("Circular dependency detected: {0}")]
    #[diagnostic(
        code(wcf::domain::circular_dependency),
        help("Check the `inputs` of the artifacts named above for a cycle.")
    )]
    CircularDependencyError(String),

    #[error("Missing input mapping: {0}")]
    #[diagnostic(code(wcf::domain::missing_input_mapping))]
    MissingInputMappingError(String),

    #[error("Invalid output mapping: {0}")]
    #[diagnostic(code(wcf::domain::invalid_output_mapping))]
    InvalidOutputMappingError(String),

    #[error("Schema compatibility error: {0}")]
    #[diagnostic(code(wcf::domain::schema_compatibility))]
    SchemaCompatibilityError(String),

    #[error("Schema not found: {0}")]
    #[diagnostic(code(wcf::domain::schema_not_found))]
    SchemaNotFoundError(String),

    #[error("Schema load error: {0}")]
    #[diagnostic(code(wcf::domain::schema_load))]
    SchemaLoadError(String),

    #[error("Message validation error: {0}")]
    #[diagnostic(
        code(wcf::domain::message_validation),
        help("The message content does not satisfy its declared schema.")
    )]
    MessageValidationError(String),

    #[error("Artifact '{0}' not found in runbook")]
    #[diagnostic(code(wcf::domain::artifact_not_found))]
    ArtifactNotFoundError(String),

    #[error("Connector configuration error: {0}")]
    #[diagnostic(code(wcf::domain::connector_config))]
    ConnectorConfigError(String),

    #[error("Connector extraction error: {0}")]
    #[diagnostic(code(wcf::domain::connector_extraction))]
    ConnectorExtractionError(String),

    #[error("Analyser error: {0}")]
    #[diagnostic(code(wcf::domain::analyser))]
    AnalyserError(String),

    #[error("Classifier error: {0}")]
    #[diagnostic(code(wcf::domain::classifier))]
    ClassifierError(String),

    #[error("Unsupported provider: {0}")]
    #[diagnostic(code(wcf::domain::unsupported_provider))]
    UnsupportedProviderError(String),

    #[error("Ruleset not found: {0}")]
    #[diagnostic(code(wcf::domain::ruleset_not_found))]
    RulesetNotFoundError(String),

    #[error("Executor error: {0}")]
    #[diagnostic(code(wcf::domain::executor))]
    ExecutorError(String),
}
