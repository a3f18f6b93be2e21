// wcf-core/src/domain/schema/message.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::DomainError;
use crate::domain::schema::registry::SchemaRegistry;
use crate::domain::schema::schema::Schema;

/// A single unit of data flowing along an edge of the artifact graph.
///
/// `content` is opaque to the pipeline itself; only [`Message::validate`] looks
/// inside it, and only against the schema the message declares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: Value,
    pub schema: Schema,
}

impl Message {
    pub fn new(id: impl Into<String>, content: Value, schema: Schema) -> Self {
        Self {
            id: id.into(),
            content,
            schema,
        }
    }

    /// Validates `content` against the JSON-Schema document named by `schema`.
    ///
    /// Resolves and compiles the document on every call; callers that validate
    /// the same schema repeatedly should rely on [`SchemaRegistry`]'s document
    /// cache rather than caching the compiled validator themselves.
    pub fn validate(&self) -> Result<(), DomainError> {
        let document = SchemaRegistry::load_document(&self.schema)?;

        let validator = jsonschema::validator_for(&document).map_err(|err| {
            DomainError::SchemaLoadError(format!(
                "schema '{}' failed to compile: {err}",
                self.schema
            ))
        })?;

        if validator.is_valid(&self.content) {
            return Ok(());
        }

        let detail = validator
            .iter_errors(&self.content)
            .map(|e| format!("{} (at {})", e, e.instance_path))
            .collect::<Vec<_>>()
            .join("; ");

        Err(DomainError::MessageValidationError(format!(
            "message '{}' does not satisfy schema '{}': {detail}",
            self.id, self.schema
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn install_schema(name: &str, version: &str, document: &Value) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join(name);
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(
            folder.join(format!("{version}.json")),
            serde_json::to_string(document).unwrap(),
        )
        .unwrap();
        SchemaRegistry::register_search_path(dir.path());
        dir
    }

    #[test]
    fn validates_conforming_content() {
        SchemaRegistry::clear_and_reinit();
        let _dir = install_schema(
            "standard_input",
            "1.0.0",
            &serde_json::json!({
                "version": "1.0.0",
                "type": "object",
                "required": ["value"],
                "properties": { "value": { "type": "string" } }
            }),
        );

        let msg = Message::new(
            "m1",
            serde_json::json!({"value": "hello"}),
            Schema::new("standard_input", "1.0.0"),
        );
        assert!(msg.validate().is_ok());
        SchemaRegistry::clear_and_reinit();
    }

    #[test]
    fn rejects_nonconforming_content() {
        SchemaRegistry::clear_and_reinit();
        let _dir = install_schema(
            "standard_input",
            "1.0.0",
            &serde_json::json!({
                "version": "1.0.0",
                "type": "object",
                "required": ["value"],
                "properties": { "value": { "type": "string" } }
            }),
        );

        let msg = Message::new(
            "m1",
            serde_json::json!({"value": 42}),
            Schema::new("standard_input", "1.0.0"),
        );
        let err = msg.validate().unwrap_err();
        assert!(matches!(err, DomainError::MessageValidationError(_)));
        SchemaRegistry::clear_and_reinit();
    }

    #[test]
    fn missing_schema_surfaces_not_found() {
        SchemaRegistry::clear_and_reinit();
        let msg = Message::new(
            "m1",
            serde_json::json!({}),
            Schema::new("nope", "1.0.0"),
        );
        let err = msg.validate().unwrap_err();
        assert!(matches!(err, DomainError::SchemaNotFoundError(_)));
        SchemaRegistry::clear_and_reinit();
    }
}
