use crate::backend::CatalogBackend;
use crate::models::{ConnectorRecord, PipelineRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use retl_core::ConnectorRole;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS connectors (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        adapter_name TEXT NOT NULL,
        role TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE INDEX IF NOT EXISTS connectors_role_idx ON connectors (role)",
    "CREATE TABLE IF NOT EXISTS pipelines (
        id TEXT PRIMARY KEY,
        source_id TEXT NOT NULL,
        destination_id TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
];

pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    /// Create a new PostgreSQL catalog
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the catalog tables when they do not exist yet
    pub async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to create catalog schema")?;
        }
        info!("Catalog schema ready");
        Ok(())
    }

    fn connector_from_row(row: &PgRow) -> Result<ConnectorRecord> {
        let role: String = row.try_get("role")?;
        Ok(ConnectorRecord {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            adapter_name: row.try_get("adapter_name")?,
            role: role.parse()?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn pipeline_from_row(row: &PgRow) -> Result<PipelineRecord> {
        Ok(PipelineRecord {
            id: row.try_get("id")?,
            source: row.try_get("source_id")?,
            destination: row.try_get("destination_id")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl CatalogBackend for PgCatalog {
    // ========== Connector Management ==========

    async fn insert_connector(&self, record: &ConnectorRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO connectors (id, name, adapter_name, role, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.adapter_name)
        .bind(record.role.as_str())
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert connector")?;

        Ok(())
    }

    async fn list_connectors(&self, role: ConnectorRole) -> Result<Vec<ConnectorRecord>> {
        let rows = sqlx::query(
            "SELECT id, name, adapter_name, role, created_at
             FROM connectors
             WHERE role = $1
             ORDER BY created_at, id",
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list connectors")?;

        rows.iter().map(Self::connector_from_row).collect()
    }

    // ========== Pipeline Management ==========

    async fn insert_pipeline(&self, record: &PipelineRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO pipelines (id, source_id, destination_id, created_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&record.id)
        .bind(&record.source)
        .bind(&record.destination)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert pipeline")?;

        Ok(())
    }

    async fn list_pipelines(&self) -> Result<Vec<PipelineRecord>> {
        let rows = sqlx::query(
            "SELECT id, source_id, destination_id, created_at
             FROM pipelines
             ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list pipelines")?;

        rows.iter().map(Self::pipeline_from_row).collect()
    }
}
