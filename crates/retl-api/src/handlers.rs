use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use retl_catalog::Catalog;
use retl_launcher::Launcher;
use serde::Serialize;
use std::time::Instant;

use crate::response::ApiResult;
use crate::ApiResponse;

pub mod connectors;
pub mod launch;
pub mod pipelines;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub launcher: Launcher,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(catalog: Catalog, launcher: Launcher) -> Self {
        Self {
            catalog,
            launcher,
            started_at: Instant::now(),
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: String,
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    };

    ApiResponse::success(response, "System is healthy")
}

/// Malformed bodies get the same envelope as validation failures
pub(crate) fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(ApiResponse::bad_request(format!(
            "Invalid request body: {}",
            rejection.body_text()
        ))),
    }
}

pub(crate) fn parse_query<T>(query: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    match query {
        Ok(Query(query)) => Ok(query),
        Err(rejection) => Err(ApiResponse::bad_request(format!(
            "Invalid query string: {}",
            rejection.body_text()
        ))),
    }
}
