use crate::decode::row_to_document;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use retl_core::{validate_table_name, Document, Error, Extractor, Result};
use serde::Deserialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};

/// Settings of the `postgres` source, read from the `POSTGRES_*` variables
#[derive(Debug, Clone, Deserialize)]
pub struct PostgresSourceConfig {
    /// Connection URL (`POSTGRES_URL`, normally a secret)
    pub url: String,

    /// Table to read, optionally schema-qualified (`POSTGRES_TABLE`)
    pub table: String,

    /// SQL condition placed after `WHERE` (`POSTGRES_FILTER`). Trusted as is.
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "TRUE".to_string()
}

/// Accept `name` or `schema.name` made of letters, digits and underscores
pub fn validate_table(table: &str) -> Result<()> {
    validate_table_name(table, 2)
}

/// Reads `SELECT * FROM <table> WHERE <filter>` once
pub struct PostgresExtractor {
    config: PostgresSourceConfig,
    query: String,
    pool: Option<PgPool>,
}

impl PostgresExtractor {
    pub fn new(config: PostgresSourceConfig) -> Result<Self> {
        validate_table(&config.table)?;
        let filter = if config.filter.trim().is_empty() {
            default_filter()
        } else {
            config.filter.clone()
        };
        let query = format!("SELECT * FROM {} WHERE {}", config.table, filter);

        Ok(Self {
            config,
            query,
            pool: None,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }
}

#[async_trait]
impl Extractor for PostgresExtractor {
    async fn open(&mut self) -> Result<()> {
        info!("Connecting to PostgreSQL source table {}", self.config.table);

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(&self.config.url)
            .await
            .map_err(|e| Error::Connection(format!("Failed to connect to PostgreSQL: {}", e)))?;

        self.pool = Some(pool);
        debug!("Query: {}", self.query);
        Ok(())
    }

    fn documents(&mut self) -> BoxStream<'_, Result<Document>> {
        let Some(pool) = self.pool.as_ref() else {
            return stream::once(async {
                Err(Error::Connection("Not connected".to_string()))
            })
            .boxed();
        };

        // Simple query protocol: every column comes back as text
        sqlx::raw_sql(&self.query)
            .fetch(pool)
            .map(|row| {
                row.map(|r| row_to_document(&r))
                    .map_err(|e| Error::Connection(format!("Failed to read row: {}", e)))
            })
            .boxed()
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
        }
        info!("Disconnected from PostgreSQL");
        Ok(())
    }
}
