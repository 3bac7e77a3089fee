use async_trait::async_trait;
use retl_core::{Document, Error, Loader, LoaderStatus, Result};
use serde::Deserialize;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, error, info};

/// Settings of the `postgres` destination, read from the `POSTGRES_*` variables
#[derive(Debug, Clone, Deserialize)]
pub struct PostgresLoaderConfig {
    /// PostgreSQL connection URL (`POSTGRES_URL`, normally a secret)
    pub url: String,

    /// Target table, created on connect (`POSTGRES_TABLE`)
    pub table: String,

    /// Target schema name
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_max_connections() -> u32 {
    2
}

/// Stores each document as one JSONB row keyed by `id`
pub struct PostgresLoader {
    config: PostgresLoaderConfig,
    pool: Option<PgPool>,
    status: LoaderStatus,
}

impl PostgresLoader {
    pub fn new(config: PostgresLoaderConfig) -> Self {
        Self {
            config,
            pool: None,
            status: LoaderStatus::default(),
        }
    }

    /// Always quote, doubling embedded quotes
    fn quote_identifier(identifier: &str) -> String {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }

    fn qualified_table(&self) -> String {
        format!(
            "{}.{}",
            Self::quote_identifier(&self.config.schema),
            Self::quote_identifier(&self.config.table)
        )
    }

    pub fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id TEXT PRIMARY KEY,
                document JSONB NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
            self.qualified_table()
        )
    }

    pub fn upsert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (id, document, updated_at) VALUES ($1, $2, NOW())
             ON CONFLICT (id) DO UPDATE SET document = EXCLUDED.document, updated_at = NOW()",
            self.qualified_table()
        )
    }
}

#[async_trait]
impl Loader for PostgresLoader {
    async fn connect(&mut self) -> Result<()> {
        info!("Connecting to PostgreSQL destination table {}", self.config.table);

        let pool = PgPoolOptions::new()
            .max_connections(self.config.max_connections)
            .connect(&self.config.url)
            .await
            .map_err(|e| Error::Connection(format!("Failed to connect to PostgreSQL: {}", e)))?;

        sqlx::query(&self.create_table_sql())
            .execute(&pool)
            .await
            .map_err(|e| Error::Connection(format!("Failed to create table: {}", e)))?;

        info!("Connected to PostgreSQL successfully");
        self.pool = Some(pool);
        self.status.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
        }
        self.status.connected = false;
        info!("Disconnected from PostgreSQL");
        Ok(())
    }

    fn identity_field(&self) -> &str {
        "id"
    }

    async fn upsert(&mut self, id: &str, document: Document) -> Result<()> {
        let pool = self
            .pool
            .as_ref()
            .ok_or_else(|| Error::Connection("Not connected".to_string()))?;

        let result = sqlx::query(&self.upsert_sql())
            .bind(id)
            .bind(Value::Object(document))
            .execute(pool)
            .await;

        match result {
            Ok(_) => {
                self.status.documents_written += 1;
                debug!("Upserted row {}", id);
                Ok(())
            }
            Err(e) => {
                let e = Error::DestinationWrite(format!("Failed to upsert '{}': {}", id, e));
                self.status.errors += 1;
                self.status.last_error = Some(e.to_string());
                error!("Failed to write document: {}", e);
                Err(e)
            }
        }
    }

    fn status(&self) -> LoaderStatus {
        self.status.clone()
    }
}
