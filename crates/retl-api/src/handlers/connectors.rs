use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use retl_core::{Connector, ConnectorConfig, ConnectorRole};
use serde::Deserialize;

use crate::handlers::{parse_body, parse_query, AppState, Created};
use crate::response::ApiResult;
use crate::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct CreateConnectorRequest {
    /// Ignored by the role-specific routes
    #[serde(default, alias = "connector_type")]
    pub role: Option<ConnectorRole>,

    #[serde(default, alias = "connector_name")]
    pub adapter_name: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub config: ConnectorConfig,
}

/// `?role=` takes the same spellings as a parsed `ConnectorRole`, in any case
#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: Option<String>,
}

async fn register(
    state: &AppState,
    role: ConnectorRole,
    request: CreateConnectorRequest,
) -> ApiResult<(StatusCode, Json<Created>)> {
    let id = state
        .catalog
        .register_connector(role, &request.adapter_name, &request.name, request.config)
        .await?;

    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn create_connector(
    State(state): State<AppState>,
    payload: Result<Json<CreateConnectorRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    let request = parse_body(payload)?;
    let role = request
        .role
        .ok_or_else(|| ApiResponse::bad_request("role is required"))?;
    register(&state, role, request).await
}

pub async fn create_source(
    State(state): State<AppState>,
    payload: Result<Json<CreateConnectorRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    register(&state, ConnectorRole::Source, parse_body(payload)?).await
}

pub async fn create_destination(
    State(state): State<AppState>,
    payload: Result<Json<CreateConnectorRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    register(&state, ConnectorRole::Destination, parse_body(payload)?).await
}

/// Without a role filter, sources come first and destinations after
pub async fn list_connectors(
    State(state): State<AppState>,
    query: Result<Query<RoleQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Connector>>> {
    let roles = match parse_query(query)?.role.as_deref().map(str::trim) {
        None | Some("") => vec![ConnectorRole::Source, ConnectorRole::Destination],
        Some(role) => vec![role.parse::<ConnectorRole>()?],
    };

    let mut connectors = Vec::new();
    for role in roles {
        connectors.extend(state.catalog.list_connectors(role).await?);
    }
    Ok(Json(connectors))
}

pub async fn list_sources(State(state): State<AppState>) -> ApiResult<Json<Vec<Connector>>> {
    Ok(Json(state.catalog.list_connectors(ConnectorRole::Source).await?))
}

pub async fn list_destinations(State(state): State<AppState>) -> ApiResult<Json<Vec<Connector>>> {
    Ok(Json(
        state
            .catalog
            .list_connectors(ConnectorRole::Destination)
            .await?,
    ))
}
