use crate::{SnowflakeExtractor, SnowflakeSourceConfig};
use retl_core::{Extractor, ExtractorFactory, Result, RuntimeEnv};

pub struct SnowflakeExtractorFactory;

impl ExtractorFactory for SnowflakeExtractorFactory {
    fn name(&self) -> &str {
        "snowflake"
    }

    fn create(&self, env: &RuntimeEnv) -> Result<Box<dyn Extractor>> {
        let config: SnowflakeSourceConfig = env.connector_section("SNOWFLAKE")?;
        Ok(Box::new(SnowflakeExtractor::new(config)?))
    }
}
