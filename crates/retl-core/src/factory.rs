use crate::{Extractor, Loader, Result, RuntimeEnv};

/// Factory trait for creating source adapters
pub trait ExtractorFactory: Send + Sync {
    /// Adapter name matched against CONNECTOR_NAME
    fn name(&self) -> &str;

    /// Create a new extractor from the execution-unit environment
    fn create(&self, env: &RuntimeEnv) -> Result<Box<dyn Extractor>>;
}

/// Factory trait for creating destination adapters
pub trait LoaderFactory: Send + Sync {
    /// Adapter name matched against CONNECTOR_NAME
    fn name(&self) -> &str;

    /// Create a new loader from the execution-unit environment
    fn create(&self, env: &RuntimeEnv) -> Result<Box<dyn Loader>>;
}
