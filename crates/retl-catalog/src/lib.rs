mod backend;
mod cache;
mod file_store;
mod models;
mod pg_store;
mod service;

pub use backend::CatalogBackend;
pub use cache::{ConfigStore, InMemoryConfigStore};
pub use file_store::FileCatalog;
pub use models::{ConnectorRecord, PipelineRecord};
pub use pg_store::PgCatalog;
pub use service::Catalog;

// Re-export for convenience
pub use async_trait::async_trait;
