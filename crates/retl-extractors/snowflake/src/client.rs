//! Minimal client for the Snowflake SQL REST API (`/api/v2/statements`).

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use retl_core::{Error, Result, SourceValue};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const STATEMENTS_PATH: &str = "/api/v2/statements";

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Delay between polls of a statement that is still running
const POLL_INTERVAL: Duration = Duration::from_millis(500);

const MAX_POLLS: u32 = 120;

/// Column description from `resultSetMetaData.rowType`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ColumnType {
    #[serde(default)]
    pub name: String,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub scale: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSetMetaData {
    #[serde(default)]
    partition_info: Vec<Value>,
    #[serde(default)]
    row_type: Vec<ColumnType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementResponse {
    statement_handle: Option<String>,
    result_set_meta_data: Option<ResultSetMetaData>,
    #[serde(default)]
    data: Vec<Vec<Value>>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PartitionResponse {
    #[serde(default)]
    data: Vec<Vec<Value>>,
}

/// First partition of a finished statement plus what is needed to page through the rest
#[derive(Debug, Clone)]
pub struct StatementResult {
    pub handle: String,
    pub columns: Vec<ColumnType>,
    pub partitions: usize,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Clone)]
pub struct SqlApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl SqlApiClient {
    pub fn new(base_url: impl Into<String>, token: &str, token_type: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| Error::Configuration(format!("Invalid Snowflake token: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(
            "x-snowflake-authorization-token-type",
            HeaderValue::from_str(token_type)
                .map_err(|e| Error::Configuration(format!("Invalid token type: {}", e)))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| Error::Connection(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Submit a statement and wait until its first partition is available
    pub async fn execute(
        &self,
        statement: &str,
        database: &str,
        warehouse: &str,
    ) -> Result<StatementResult> {
        let body = json!({
            "statement": statement,
            "database": database,
            "warehouse": warehouse,
            "timeout": DEFAULT_TIMEOUT.as_secs(),
        });

        let response = self
            .http
            .post(format!("{}{}", self.base_url, STATEMENTS_PATH))
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Connection(format!("Failed to submit statement: {}", e)))?;

        let mut status = response.status();
        let mut parsed = Self::parse(response).await?;

        let mut polls = 0;
        while status == StatusCode::ACCEPTED {
            polls += 1;
            if polls > MAX_POLLS {
                return Err(Error::Connection("Statement did not finish in time".to_string()));
            }
            let handle = parsed
                .statement_handle
                .clone()
                .ok_or_else(|| Error::Connection("Running statement has no handle".to_string()))?;

            tokio::time::sleep(POLL_INTERVAL).await;
            debug!("Polling statement {}", handle);

            let response = self
                .http
                .get(format!("{}{}/{}", self.base_url, STATEMENTS_PATH, handle))
                .send()
                .await
                .map_err(|e| Error::Connection(format!("Failed to poll statement: {}", e)))?;
            status = response.status();
            parsed = Self::parse(response).await?;
        }

        let handle = parsed.statement_handle.unwrap_or_default();
        let meta = parsed
            .result_set_meta_data
            .ok_or_else(|| Error::Connection("Response has no result set metadata".to_string()))?;

        Ok(StatementResult {
            handle,
            columns: meta.row_type,
            partitions: meta.partition_info.len().max(1),
            rows: parsed.data,
        })
    }

    /// Fetch the rows of partition `index` (> 0) of a finished statement
    pub async fn partition(&self, handle: &str, index: usize) -> Result<Vec<Vec<Value>>> {
        let response = self
            .http
            .get(format!("{}{}/{}", self.base_url, STATEMENTS_PATH, handle))
            .query(&[("partition", index)])
            .send()
            .await
            .map_err(|e| Error::Connection(format!("Failed to fetch partition {}: {}", index, e)))?;

        if !response.status().is_success() {
            return Err(Error::Connection(format!(
                "Fetching partition {} failed with status {}",
                index,
                response.status()
            )));
        }

        let page: PartitionResponse = response
            .json()
            .await
            .map_err(|e| Error::Connection(format!("Invalid partition response: {}", e)))?;
        Ok(page.data)
    }

    async fn parse(response: reqwest::Response) -> Result<StatementResponse> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Connection(format!("Failed to read response: {}", e)))?;

        let parsed: StatementResponse = serde_json::from_str(&text).map_err(|e| {
            Error::Connection(format!("Invalid response ({}): {}", status, e))
        })?;

        if !status.is_success() {
            return Err(Error::Connection(format!(
                "Statement failed ({}): {}",
                status,
                parsed.message.as_deref().unwrap_or("no message")
            )));
        }
        Ok(parsed)
    }
}

/// Convert one cell of the JSON result format, where every value arrives as text
pub fn cell_value(column: &ColumnType, cell: Value) -> SourceValue {
    let text = match cell {
        Value::Null => return SourceValue::Null,
        Value::String(s) => s,
        other => return SourceValue::Json(other),
    };

    match column.kind.to_ascii_lowercase().as_str() {
        "fixed" if column.scale.unwrap_or(0) == 0 => text
            .parse::<i64>()
            .map(SourceValue::Int)
            .unwrap_or(SourceValue::Text(text)),
        "fixed" | "real" => text
            .parse::<f64>()
            .map(SourceValue::Float)
            .unwrap_or(SourceValue::Text(text)),
        "boolean" => SourceValue::Bool(text.eq_ignore_ascii_case("true") || text == "1"),
        "variant" | "object" | "array" => serde_json::from_str(&text)
            .map(SourceValue::Json)
            .unwrap_or(SourceValue::Text(text)),
        _ => SourceValue::Text(text),
    }
}
