//! Leadbase REST API
//!
//! # API Structure
//!
//! ```text
//! /api/
//! ├── /activity-logs?action=  - createActivityLog, getActivityLogs,
//! │                             getActivityLogStats, getActivityTypes
//! ├── /auth?action=signout    - end the session, log the logout
//! └── /workspace?action=getActiveWorkspace
//! /health, /ready             - liveness and readiness
//! /api-docs/openapi.json      - OpenAPI document
//! ```
//!
//! Every `/api` route requires `Authorization: Bearer <token>`.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderName;
use axum::Router;
use leadbase_auth::AuthLayer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Enable CORS for browser clients
    pub enable_cors: bool,
    /// Allowed origins for CORS, `*` for any
    pub cors_origins: Vec<String>,
    pub enable_compression: bool,
    pub enable_tracing: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
            enable_compression: true,
            enable_tracing: true,
            max_body_size: 1024 * 1024,
        }
    }
}

/// Create the main API router with all middleware
pub fn create_router(state: Arc<AppState>, config: ApiConfig) -> Router {
    let api = routes::api_routes()
        .layer(AuthLayer::new(state.sessions.clone()))
        .layer(DefaultBodyLimit::max(config.max_body_size));

    let mut router = Router::new()
        .nest("/api", api)
        .merge(routes::service_routes())
        .with_state(state);

    let x_request_id = HeaderName::from_static("x-request-id");
    router = router
        .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
        .layer(PropagateRequestIdLayer::new(x_request_id));

    if config.enable_tracing {
        router = router.layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");

                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            },
        ));
    }

    if config.enable_compression {
        router = router.layer(CompressionLayer::new());
    }

    if config.enable_cors {
        let cors = if config.cors_origins.iter().any(|o| o == "*") {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(
                    config
                        .cors_origins
                        .iter()
                        .filter_map(|o| o.parse().ok())
                        .collect::<Vec<_>>(),
                )
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(Any)
        };
        router = router.layer(cors);
    }

    router
}
