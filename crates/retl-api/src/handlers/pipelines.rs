use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use retl_core::{Pipeline, PipelineCount};
use serde::Deserialize;

use crate::handlers::{parse_body, AppState, Created};
use crate::response::ApiResult;

#[derive(Debug, Deserialize)]
pub struct BindPipelineRequest {
    #[serde(default, alias = "source")]
    pub source_id: String,

    #[serde(default, alias = "destination")]
    pub destination_id: String,
}

pub async fn create_pipeline(
    State(state): State<AppState>,
    payload: Result<Json<BindPipelineRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    let request = parse_body(payload)?;
    let id = state
        .catalog
        .bind_pipeline(&request.source_id, &request.destination_id)
        .await?;

    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn list_pipelines(State(state): State<AppState>) -> ApiResult<Json<Vec<Pipeline>>> {
    Ok(Json(state.catalog.list_pipelines().await?))
}

pub async fn pipeline_counts(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PipelineCount>>> {
    Ok(Json(state.catalog.pipeline_counts().await?))
}
