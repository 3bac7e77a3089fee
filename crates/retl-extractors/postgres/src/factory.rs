use crate::{PostgresExtractor, PostgresSourceConfig};
use retl_core::{Extractor, ExtractorFactory, Result, RuntimeEnv};

pub struct PostgresExtractorFactory;

impl ExtractorFactory for PostgresExtractorFactory {
    fn name(&self) -> &str {
        "postgres"
    }

    fn create(&self, env: &RuntimeEnv) -> Result<Box<dyn Extractor>> {
        let config: PostgresSourceConfig = env.connector_section("POSTGRES")?;
        Ok(Box::new(PostgresExtractor::new(config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retl_core::{ConnectorConfig, Error};
    use retl_launcher::build_environment;
    use serde_json::json;

    fn unit_env(config: serde_json::Value) -> RuntimeEnv {
        let config: ConnectorConfig = serde_json::from_value(config).unwrap();
        RuntimeEnv::from_vars(build_environment("orders-to-search", "postgres", &config).unwrap())
    }

    #[test]
    fn test_create_from_registered_settings() {
        let env = unit_env(json!({
            "settings": {"table": "t", "filter": "1=1"},
            "secrets": {"url": "postgres://db/shop"}
        }));
        assert!(PostgresExtractorFactory.create(&env).is_ok());

        let config: PostgresSourceConfig = env.connector_section("POSTGRES").unwrap();
        assert_eq!(
            PostgresExtractor::new(config).unwrap().query(),
            "SELECT * FROM t WHERE 1=1"
        );
    }

    #[test]
    fn test_prefixed_settings_win() {
        let env = unit_env(json!({
            "settings": {"table": "t", "POSTGRES_TABLE": "orders"},
            "secrets": {"POSTGRES_URL": "postgres://db/shop"}
        }));
        let config: PostgresSourceConfig = env.connector_section("POSTGRES").unwrap();
        assert_eq!(config.table, "orders");
        assert_eq!(config.filter, "TRUE");
    }

    #[test]
    fn test_missing_url_is_a_configuration_error() {
        let env = unit_env(json!({"settings": {"table": "t"}}));
        assert!(matches!(
            PostgresExtractorFactory.create(&env),
            Err(Error::Configuration(_))
        ));
    }
}
