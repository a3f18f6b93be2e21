// wcf-core/src/domain/runbook/mod.rs

pub mod model;

pub use model::{
    Artifact, ChildRunbookConfig, InputRef, MergePolicy, ProcessConfig, Runbook, RunbookConfig,
    RunbookInput, RunbookOutput, SchemaRef, SourceConfig,
};
