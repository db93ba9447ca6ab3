//! API Routes

use axum::{
    routing::{any, get},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::openapi;
use crate::state::AppState;

/// Authenticated routes under `/api`. Each path dispatches on `?action=`.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/activity-logs", any(handlers::activity_logs::dispatch))
        .route("/auth", any(handlers::auth::dispatch))
        .route("/workspace", any(handlers::workspace::dispatch))
}

/// Liveness, readiness and the OpenAPI document
pub fn service_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
}
