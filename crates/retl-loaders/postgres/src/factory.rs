use crate::{PostgresLoader, PostgresLoaderConfig};
use retl_core::{Loader, LoaderFactory, Result, RuntimeEnv};

pub struct PostgresLoaderFactory;

impl LoaderFactory for PostgresLoaderFactory {
    fn name(&self) -> &str {
        "postgres"
    }

    fn create(&self, env: &RuntimeEnv) -> Result<Box<dyn Loader>> {
        let config: PostgresLoaderConfig = env.connector_section("POSTGRES")?;
        Ok(Box::new(PostgresLoader::new(config)))
    }
}
