use crate::models::{ConnectorRecord, PipelineRecord};
use anyhow::Result;
use async_trait::async_trait;
use retl_core::ConnectorRole;

/// Trait for durable catalog storage backends
///
/// Rows are write-once: there is no update or delete.
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    // Connector operations
    async fn insert_connector(&self, record: &ConnectorRecord) -> Result<()>;
    async fn list_connectors(&self, role: ConnectorRole) -> Result<Vec<ConnectorRecord>>;

    // Pipeline operations
    async fn insert_pipeline(&self, record: &PipelineRecord) -> Result<()>;
    async fn list_pipelines(&self) -> Result<Vec<PipelineRecord>>;
}
