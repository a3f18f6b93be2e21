// wcf-core/src/ports/connector.rs

use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::schema::{Message, Schema};

/// What the executor needs from a source artifact, without knowing which
/// filesystem, database, or repository backs it.
#[async_trait]
pub trait Connector: Send + Sync {
    fn get_name(&self) -> &str;

    fn get_supported_output_schemas(&self) -> Vec<Schema>;

    /// Produces one message against `output_schema`. `Message.schema` on the
    /// returned value must equal `output_schema`.
    async fn extract(&self, output_schema: &Schema) -> Result<Message, DomainError>;
}
