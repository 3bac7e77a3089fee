use crate::{Document, Result};
use async_trait::async_trait;

/// Trait for destination adapters
#[async_trait]
pub trait Loader: Send {
    /// Connect to the destination
    async fn connect(&mut self) -> Result<()>;

    /// Disconnect from the destination
    async fn disconnect(&mut self) -> Result<()>;

    /// Document field holding the destination identity (e.g. `objectID`)
    fn identity_field(&self) -> &str;

    /// Insert the document under `id`, replacing any document already stored there
    async fn upsert(&mut self, id: &str, document: Document) -> Result<()>;

    /// Get loader status information
    fn status(&self) -> LoaderStatus;
}

#[derive(Debug, Clone, Default)]
pub struct LoaderStatus {
    pub connected: bool,
    pub documents_written: u64,
    pub errors: u64,
    pub last_error: Option<String>,
}
