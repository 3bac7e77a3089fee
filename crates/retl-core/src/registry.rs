use crate::{Error, ExtractorFactory, LoaderFactory, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry for extractor and loader factories, keyed by adapter name
pub struct Registry {
    extractor_factories: HashMap<String, Arc<dyn ExtractorFactory>>,
    loader_factories: HashMap<String, Arc<dyn LoaderFactory>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            extractor_factories: HashMap::new(),
            loader_factories: HashMap::new(),
        }
    }

    /// Register an extractor factory
    pub fn register_extractor(&mut self, factory: Arc<dyn ExtractorFactory>) {
        let name = factory.name().to_string();
        self.extractor_factories.insert(name, factory);
    }

    /// Register a loader factory
    pub fn register_loader(&mut self, factory: Arc<dyn LoaderFactory>) {
        let name = factory.name().to_string();
        self.loader_factories.insert(name, factory);
    }

    /// Get an extractor factory by adapter name
    pub fn get_extractor_factory(&self, name: &str) -> Result<Arc<dyn ExtractorFactory>> {
        self.extractor_factories
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Configuration(format!("Extractor '{}' not found", name)))
    }

    /// Get a loader factory by adapter name
    pub fn get_loader_factory(&self, name: &str) -> Result<Arc<dyn LoaderFactory>> {
        self.loader_factories
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Configuration(format!("Loader '{}' not found", name)))
    }

    /// List all registered extractor adapters
    pub fn list_extractors(&self) -> Vec<String> {
        let mut names: Vec<_> = self.extractor_factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// List all registered loader adapters
    pub fn list_loaders(&self) -> Vec<String> {
        let mut names: Vec<_> = self.loader_factories.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
