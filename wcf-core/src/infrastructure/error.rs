// wcf-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    #[error("Runbook load error: {0}")]
    #[diagnostic(
        code(wcf::infra::runbook_load),
        help("Check the path exists and is readable.")
    )]
    RunbookLoadError(String),

    #[error("File System Error: {0}")]
    #[diagnostic(
        code(wcf::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(wcf::infra::yaml),
        help("Check the runbook's YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON Parsing Error: {0}")]
    #[diagnostic(code(wcf::infra::json))]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(wcf::infra::config))]
    ConfigError(String),

    #[error("Schema document error: {0}")]
    #[diagnostic(
        code(wcf::infra::schema_document),
        help("The JSON-Schema document could not be compiled.")
    )]
    SchemaDocumentError(String),
}
