//! Health Check Handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    /// `ready` or `not_ready`
    pub status: String,
    pub database: ComponentStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentStatus {
    pub name: String,
    /// `healthy` or `unhealthy`
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Liveness: the process is up. Dependencies are not checked.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().timestamp_millis(),
    })
}

/// Readiness: the activity store answers.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessResponse),
        (status = 503, description = "Service is not ready", body = ReadinessResponse)
    )
)]
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let started = std::time::Instant::now();

    let (ready, database) = match state.store.health_check().await {
        Ok(()) => (
            true,
            ComponentStatus {
                name: "PostgreSQL".to_string(),
                status: "healthy".to_string(),
                latency_ms: Some(started.elapsed().as_millis() as u64),
                error: None,
            },
        ),
        Err(e) => (
            false,
            ComponentStatus {
                name: "PostgreSQL".to_string(),
                status: "unhealthy".to_string(),
                latency_ms: None,
                error: Some(e.to_string()),
            },
        ),
    };

    let (status_code, status) = if ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    (
        status_code,
        Json(ReadinessResponse {
            status: status.to_string(),
            database,
        }),
    )
}
