pub mod response;

use crate::config::Config;
use crate::error::AppError;
use crate::features::{self, FeatureState};
use crate::middleware;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower_http::compression::CompressionLayer;

/// Create the application router with all routes and middleware
pub fn create_router(state: FeatureState, config: &Config) -> Router {
    let feature_routes = features::router(state.clone());

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .with_state(state)
        .nest("/api/v1", feature_routes)
        // Applied from innermost to outermost
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Roster Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// Reports whether the employee store is reachable
async fn health_check(State(state): State<FeatureState>) -> Result<impl IntoResponse, AppError> {
    state.store.health_check().await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "store": "connected"
        })),
    ))
}
