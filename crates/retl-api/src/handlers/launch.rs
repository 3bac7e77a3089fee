use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use retl_core::{ConnectorConfig, ConnectorRole};
use retl_launcher::LaunchRequest;
use serde::Deserialize;
use tracing::info;

use crate::handlers::{parse_body, AppState};
use crate::response::ApiResult;
use crate::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct LaunchBody {
    #[serde(default)]
    pub pipeline_name: String,

    #[serde(default, alias = "connector_type")]
    pub role: Option<ConnectorRole>,

    #[serde(default, alias = "connector_name")]
    pub adapter_name: String,

    /// Inline configuration; wins over `connector_id`
    #[serde(default)]
    pub config: Option<ConnectorConfig>,

    /// Use the cached configuration of a registered connector
    #[serde(default)]
    pub connector_id: Option<String>,

    /// Pipeline whose launch counter is bumped on success
    #[serde(default)]
    pub pipeline_id: Option<String>,
}

async fn resolve_config(state: &AppState, body: &mut LaunchBody) -> ApiResult<ConnectorConfig> {
    if let Some(config) = body.config.take() {
        return Ok(config);
    }
    match &body.connector_id {
        Some(id) => state.catalog.connector_config(id).await.ok_or_else(|| {
            ApiResponse::bad_request(format!("Connector {} has no cached configuration", id))
        }),
        None => Ok(ConnectorConfig::default()),
    }
}

/// Submit one execution unit and return without waiting for it
pub async fn launch(
    State(state): State<AppState>,
    payload: Result<Json<LaunchBody>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let mut body = parse_body(payload)?;
    let role = body
        .role
        .ok_or_else(|| ApiResponse::bad_request("role is required"))?;
    let config = resolve_config(&state, &mut body).await?;

    let request = LaunchRequest {
        pipeline_name: body.pipeline_name,
        role,
        adapter_name: body.adapter_name,
        config,
    };
    let unit = state.launcher.launch(&request).await?;
    info!("[{}] Submitted unit {}", request.pipeline_name, unit.name);

    if let Some(pipeline_id) = body.pipeline_id.filter(|id| !id.is_empty()) {
        state.catalog.counters().increment(&pipeline_id).await;
    }

    Ok(StatusCode::ACCEPTED)
}
