use crate::{AlgoliaConfig, AlgoliaLoader};
use retl_core::{Loader, LoaderFactory, Result, RuntimeEnv};

pub struct AlgoliaLoaderFactory;

impl LoaderFactory for AlgoliaLoaderFactory {
    fn name(&self) -> &str {
        "algolia"
    }

    fn create(&self, env: &RuntimeEnv) -> Result<Box<dyn Loader>> {
        let config: AlgoliaConfig = env.connector_section("ALGOLIA")?;
        Ok(Box::new(AlgoliaLoader::new(config)?))
    }
}
