use crate::handlers::{connectors, health_check, launch, pipelines, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// All routes, including the legacy aliases
pub fn build_router(state: AppState, cors_enabled: bool) -> Router {
    let mut app = Router::new()
        .route("/health", get(health_check))
        // Connector management
        .route(
            "/api/connectors",
            get(connectors::list_connectors).post(connectors::create_connector),
        )
        .route("/input/create", post(connectors::create_source))
        .route("/output/create", post(connectors::create_destination))
        .route("/inputs", get(connectors::list_sources))
        .route("/outputs", get(connectors::list_destinations))
        // Pipeline management
        .route(
            "/api/pipelines",
            get(pipelines::list_pipelines).post(pipelines::create_pipeline),
        )
        .route("/pipeline/create", post(pipelines::create_pipeline))
        .route("/pipelines", get(pipelines::list_pipelines))
        .route("/api/pipeline-counts", get(pipelines::pipeline_counts))
        .route("/pipeline-counts", get(pipelines::pipeline_counts))
        // Execution units
        .route("/api/launch", post(launch::launch))
        .route("/start", post(launch::launch))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        app = app.layer(cors);
    }

    app
}

pub struct ApiServer {
    host: String,
    port: u16,
    cors_enabled: bool,
    state: AppState,
}

impl ApiServer {
    pub fn new(host: String, port: u16, cors_enabled: bool, state: AppState) -> Self {
        Self {
            host,
            port,
            cors_enabled,
            state,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let app = build_router(self.state, self.cors_enabled);

        let addr = format!("{}:{}", self.host, self.port);
        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
