// wcf-core/src/domain/schema/mod.rs

pub mod message;
pub mod registry;
pub mod schema;

pub use message::Message;
pub use registry::SchemaRegistry;
pub use schema::Schema;
