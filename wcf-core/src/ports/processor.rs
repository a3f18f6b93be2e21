// wcf-core/src/ports/processor.rs

use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::schema::{Message, Schema};

/// One alternative, ordered combination of input schemas a processor accepts.
/// A factory may declare several such alternatives; the planner's compatibility
/// check accepts an artifact if at least one alternative matches the resolved
/// predecessor schemas, in order.
pub type InputRequirement = Vec<Schema>;

/// What the executor needs from a processed artifact (analyser or classifier).
#[async_trait]
pub trait Processor: Send + Sync {
    fn get_name(&self) -> &str;

    fn get_supported_output_schemas(&self) -> Vec<Schema>;

    /// Alternative accepted input-schema combinations, in preference order.
    fn get_input_requirements(&self) -> Vec<InputRequirement>;

    /// True if this processor accepts more than one input message at a time
    /// (its `process_many` must be used instead of `process`).
    fn is_multi_input(&self) -> bool {
        false
    }

    async fn process(
        &self,
        input_schema: &Schema,
        output_schema: &Schema,
        message: Message,
    ) -> Result<Message, DomainError>;

    /// Multi-input variant. Default implementation rejects — override when
    /// `is_multi_input()` returns true.
    async fn process_many(
        &self,
        _inputs: Vec<Message>,
        _output_schema: &Schema,
    ) -> Result<Message, DomainError> {
        Err(DomainError::AnalyserError(format!(
            "processor '{}' does not support multi-input invocation",
            self.get_name()
        )))
    }
}

/// A classifier is an analyser that additionally names the compliance framework
/// (e.g. GDPR, CCPA) its findings are expressed against.
#[async_trait]
pub trait Classifier: Processor {
    fn get_framework(&self) -> &str;
}
