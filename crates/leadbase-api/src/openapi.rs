//! OpenAPI Documentation
//!
//! Served as JSON at `/api-docs/openapi.json`.

use axum::Json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

use crate::dto;
use crate::error::ErrorResponse;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leadbase Activity API",
        description = "Member activity logging for Leadbase workspaces: record, list and aggregate who did what, where and when.",
        version = "1.0.0"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local Development")
    ),
    paths(
        // Health
        handlers::health::health_check,
        handlers::health::readiness_check,
        // Activity logs
        handlers::activity_logs::create_activity_log,
        handlers::activity_logs::get_activity_logs,
        handlers::activity_logs::get_activity_log_stats,
        handlers::activity_logs::get_activity_types,
        // Session / workspace
        handlers::auth::signout,
        handlers::workspace::get_active_workspace,
    ),
    components(
        schemas(
            ErrorResponse,
            handlers::health::HealthResponse,
            handlers::health::ReadinessResponse,
            handlers::health::ComponentStatus,
            dto::CreateActivityLogRequest,
            dto::CreateActivityLogResponse,
            dto::ActivityLogDto,
            dto::ActivityLogPageResponse,
            dto::ActivityLogStatsResponse,
            dto::MemberActivityDto,
            dto::ActivityTypeCountDto,
            dto::ActivityTypeOptionDto,
            dto::ActivityTypesResponse,
            dto::SignOutResponse,
            dto::ActiveWorkspace,
            dto::ActiveWorkspaceResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service health and status"),
        (name = "Activity Logs", description = "Member activity audit trail"),
        (name = "Authentication", description = "Session management"),
        (name = "Workspace", description = "Active workspace resolution")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Bearer JWT security scheme
pub struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
