use crate::client::{cell_value, ColumnType, SqlApiClient, StatementResult};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use retl_core::{normalize_row, validate_table_name, Document, Error, Extractor, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;
use tracing::{debug, info};

/// Settings of the `snowflake` source, read from the `SNOWFLAKE_*` variables
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeSourceConfig {
    /// Account identifier, e.g. `myorg-myaccount` (`SNOWFLAKE_ACCOUNT`)
    pub account: String,

    pub database: String,

    pub warehouse: String,

    /// Statement to run (`SNOWFLAKE_QUERY`)
    pub query: Option<String>,

    /// Table sampled with `LIMIT 10` when no query is given (`SNOWFLAKE_TABLE`)
    pub table: Option<String>,

    /// OAuth or key-pair JWT token (`SNOWFLAKE_TOKEN`, normally a secret)
    pub token: String,

    #[serde(default = "default_token_type")]
    pub token_type: String,

    /// Overrides `https://<account>.snowflakecomputing.com`
    pub base_url: Option<String>,
}

fn default_token_type() -> String {
    "OAUTH".to_string()
}

impl SnowflakeSourceConfig {
    pub fn statement(&self) -> Result<String> {
        match (&self.query, &self.table) {
            (Some(query), _) if !query.trim().is_empty() => Ok(query.clone()),
            (_, Some(table)) if !table.trim().is_empty() => {
                // database.schema.table at most
                validate_table_name(table, 3)?;
                Ok(format!("SELECT * FROM {} LIMIT 10", table))
            }
            _ => Err(Error::Configuration(
                "SNOWFLAKE_QUERY or SNOWFLAKE_TABLE must be set".to_string(),
            )),
        }
    }

    pub fn endpoint(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}.snowflakecomputing.com", self.account))
    }
}

struct Pages {
    handle: String,
    columns: Vec<ColumnType>,
    partitions: usize,
    next_partition: usize,
    rows: VecDeque<Vec<Value>>,
}

fn to_document(columns: &[ColumnType], row: Vec<Value>) -> Document {
    normalize_row(row.into_iter().enumerate().map(|(index, cell)| {
        match columns.get(index) {
            Some(column) => (Some(column.name.clone()), cell_value(column, cell)),
            None => (None, retl_core::SourceValue::Json(cell)),
        }
    }))
}

/// Runs one statement and streams every partition of its result
pub struct SnowflakeExtractor {
    config: SnowflakeSourceConfig,
    statement: String,
    client: SqlApiClient,
    result: Option<StatementResult>,
}

impl SnowflakeExtractor {
    pub fn new(config: SnowflakeSourceConfig) -> Result<Self> {
        let statement = config.statement()?;
        let client = SqlApiClient::new(config.endpoint(), &config.token, &config.token_type)?;
        Ok(Self {
            config,
            statement,
            client,
            result: None,
        })
    }
}

#[async_trait]
impl Extractor for SnowflakeExtractor {
    async fn open(&mut self) -> Result<()> {
        info!(
            "Running Snowflake statement on {}/{}",
            self.config.database, self.config.warehouse
        );
        let result = self
            .client
            .execute(&self.statement, &self.config.database, &self.config.warehouse)
            .await?;

        info!(
            "Statement {} returned {} partition(s)",
            result.handle, result.partitions
        );
        self.result = Some(result);
        Ok(())
    }

    fn documents(&mut self) -> BoxStream<'_, Result<Document>> {
        let Some(result) = self.result.take() else {
            return stream::once(async {
                Err(Error::Connection("Statement has not been run".to_string()))
            })
            .boxed();
        };

        let client = &self.client;
        let pages = Pages {
            handle: result.handle,
            columns: result.columns,
            partitions: result.partitions,
            next_partition: 1,
            rows: result.rows.into(),
        };

        stream::try_unfold(pages, move |mut pages| async move {
            loop {
                if let Some(row) = pages.rows.pop_front() {
                    let document = to_document(&pages.columns, row);
                    return Ok(Some((document, pages)));
                }
                if pages.next_partition >= pages.partitions {
                    return Ok(None);
                }
                debug!("Fetching partition {}", pages.next_partition);
                let rows = match client.partition(&pages.handle, pages.next_partition).await {
                    Ok(rows) => rows,
                    Err(e) => return Err(e),
                };
                pages.next_partition += 1;
                pages.rows.extend(rows);
            }
        })
        .boxed()
    }

    async fn close(&mut self) -> Result<()> {
        self.result = None;
        Ok(())
    }
}
