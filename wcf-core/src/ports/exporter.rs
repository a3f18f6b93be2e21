// wcf-core/src/ports/exporter.rs

use async_trait::async_trait;

use crate::application::export::CoreExport;
use crate::domain::error::DomainError;

/// Writes a completed run's [`CoreExport`] to some sink (stdout, a file, an
/// object store). The core only ever produces a `CoreExport` value; the exporter
/// decides its serialisation and destination.
#[async_trait]
pub trait Exporter: Send + Sync {
    fn get_name(&self) -> &str;

    async fn export(&self, export: &CoreExport) -> Result<(), DomainError>;
}
