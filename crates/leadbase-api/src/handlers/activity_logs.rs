//! Activity log endpoint
//!
//! `/api/activity-logs?action=<name>`: one route, dispatched on method and
//! action. Validation happens before the Access Guard, and the guard runs
//! before any store access.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use http::Method;
use leadbase_activity::LogOutcome;
use leadbase_auth::{AuthenticatedUser, RequireAuth};
use leadbase_types::RequestOrigin;
use std::sync::Arc;

use crate::dto::{
    ActivityLogDto, ActivityLogPageResponse, ActivityLogStatsResponse, ActivityLogsParams,
    ActivityTypesResponse, CreateActivityLogRequest, CreateActivityLogResponse,
    LOGGED_SUCCESSFULLY,
};
use crate::error::{ApiError, ApiResult, ErrorResponse};
use crate::extractors::ClientOrigin;
use crate::state::AppState;

pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    method: Method,
    ClientOrigin(origin): ClientOrigin,
    Query(params): Query<ActivityLogsParams>,
    body: Bytes,
) -> ApiResult<Response> {
    match (method, params.action()) {
        (Method::POST, "createActivityLog") => {
            create_activity_log(&state, &user, origin, &body).await
        }
        (Method::GET, "getActivityLogs") => get_activity_logs(&state, &user, &params)
            .await
            .map(IntoResponse::into_response),
        (Method::GET, "getActivityLogStats") => get_activity_log_stats(&state, &user, &params)
            .await
            .map(IntoResponse::into_response),
        (Method::GET, "getActivityTypes") => Ok(get_activity_types(&state).into_response()),
        (Method::GET | Method::POST, action) => Err(ApiError::UnknownAction(action.to_string())),
        _ => Err(ApiError::MethodNotAllowed),
    }
}

/// Record an activity for the caller
#[utoipa::path(
    post,
    path = "/api/activity-logs?action=createActivityLog",
    tag = "Activity Logs",
    request_body = CreateActivityLogRequest,
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Activity logged, or LOGIN skipped by the cooling period", body = CreateActivityLogResponse),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "No access to the workspace", body = ErrorResponse),
        (status = 500, description = "The entry could not be stored", body = ErrorResponse)
    )
)]
pub async fn create_activity_log(
    state: &AppState,
    user: &AuthenticatedUser,
    origin: RequestOrigin,
    body: &[u8],
) -> ApiResult<Response> {
    let request: CreateActivityLogRequest = if body.is_empty() {
        CreateActivityLogRequest::default()
    } else {
        serde_json::from_slice(body)?
    };
    let (workspace_id, request) = request.into_log_request(user.user_id, origin)?;

    state.guard.require_access(workspace_id, user.user_id).await?;

    match state.logger.log_activity(request).await {
        LogOutcome::Logged(entry) => {
            Ok(created(LOGGED_SUCCESSFULLY.to_string(), Some(entry.into())))
        }
        LogOutcome::Skipped { message } => Ok(created(message, None)),
        LogOutcome::Rejected { error } => Err(ApiError::BadRequest(error)),
        LogOutcome::Failed { error } => Err(ApiError::Internal(error)),
    }
}

fn created(message: String, data: Option<ActivityLogDto>) -> Response {
    (
        StatusCode::CREATED,
        Json(CreateActivityLogResponse { message, data }),
    )
        .into_response()
}

/// List a workspace's activity, newest first
#[utoipa::path(
    get,
    path = "/api/activity-logs?action=getActivityLogs",
    tag = "Activity Logs",
    params(ActivityLogsParams),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "One page of entries", body = ActivityLogPageResponse),
        (status = 400, description = "Missing workspace_id or invalid filter", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "No access to the workspace", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    )
)]
pub async fn get_activity_logs(
    state: &AppState,
    user: &AuthenticatedUser,
    params: &ActivityLogsParams,
) -> ApiResult<Json<ActivityLogPageResponse>> {
    let filter = params.to_filter()?;
    let page = state.query.list(user.user_id, filter).await?;
    Ok(Json(page.into()))
}

/// Aggregate activity statistics of a workspace
#[utoipa::path(
    get,
    path = "/api/activity-logs?action=getActivityLogStats",
    tag = "Activity Logs",
    params(("workspace_id" = String, Query, description = "Numeric workspace id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Workspace statistics", body = ActivityLogStatsResponse),
        (status = 400, description = "Missing or invalid workspace_id", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "No access to the workspace", body = ErrorResponse),
        (status = 500, description = "Store error", body = ErrorResponse)
    )
)]
pub async fn get_activity_log_stats(
    state: &AppState,
    user: &AuthenticatedUser,
    params: &ActivityLogsParams,
) -> ApiResult<Json<ActivityLogStatsResponse>> {
    let workspace_id = params.workspace_id()?;
    let stats = state.query.stats(user.user_id, workspace_id).await?;
    Ok(Json(stats.into()))
}

/// Every activity type with its display label
#[utoipa::path(
    get,
    path = "/api/activity-logs?action=getActivityTypes",
    tag = "Activity Logs",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The activity type registry", body = ActivityTypesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub fn get_activity_types(state: &AppState) -> Json<ActivityTypesResponse> {
    Json(ActivityTypesResponse {
        data: state
            .query
            .activity_types()
            .into_iter()
            .map(Into::into)
            .collect(),
    })
}
