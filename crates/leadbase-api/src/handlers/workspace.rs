//! Workspace endpoint
//!
//! `/api/workspace?action=getActiveWorkspace` returns the caller's active
//! workspace, activating their first accepted membership when none is
//! active yet. Activation records a `workspace_join`; a fresh browser login
//! on an already active workspace records a `login`.

use axum::{
    extract::{Query, State},
    Json,
};
use http::{HeaderMap, Method};
use leadbase_activity::events;
use leadbase_auth::{AuthenticatedUser, RequireAuth};
use leadbase_types::RequestOrigin;
use std::sync::Arc;
use tracing::{debug, info};

use crate::dto::{ActionQuery, ActiveWorkspaceResponse, NO_WORKSPACES};
use crate::error::{ApiError, ApiResult, ErrorResponse};
use crate::extractors::ClientOrigin;
use crate::state::AppState;

/// Set by the web client on the first request after an auth state change
pub const FRESH_LOGIN_HEADER: &str = "x-fresh-login";

pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    method: Method,
    headers: HeaderMap,
    ClientOrigin(origin): ClientOrigin,
    Query(query): Query<ActionQuery>,
) -> ApiResult<Json<ActiveWorkspaceResponse>> {
    match (method, query.action()) {
        (Method::GET, "getActiveWorkspace") => {
            get_active_workspace(&state, &user, is_fresh_login(&headers), origin).await
        }
        (Method::GET, action) => Err(ApiError::UnknownAction(action.to_string())),
        _ => Err(ApiError::MethodNotAllowed),
    }
}

fn is_fresh_login(headers: &HeaderMap) -> bool {
    headers
        .get(FRESH_LOGIN_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "true")
}

/// The caller's active workspace
#[utoipa::path(
    get,
    path = "/api/workspace?action=getActiveWorkspace",
    tag = "Workspace",
    params(("x-fresh-login" = Option<String>, Header, description = "`true` on the first request after sign-in")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Active workspace", body = ActiveWorkspaceResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "The caller belongs to no workspace", body = ErrorResponse)
    )
)]
pub async fn get_active_workspace(
    state: &AppState,
    user: &AuthenticatedUser,
    fresh_login: bool,
    origin: RequestOrigin,
) -> ApiResult<Json<ActiveWorkspaceResponse>> {
    let actor = user.actor();

    if let Some(active) = state.directory.active_membership(user.user_id).await? {
        if fresh_login && origin.is_browser() {
            let event = events::login(active.workspace_id, &actor).with_origin(&origin);
            state.recorder.record(event).await;
        } else {
            debug!(user_id = %user.user_id, "Not a fresh browser login, login not logged");
        }
        return Ok(Json(ActiveWorkspaceResponse {
            data: active.into(),
        }));
    }

    let first = state
        .directory
        .first_accepted_membership(user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NO_WORKSPACES.to_string()))?;

    state
        .directory
        .activate_membership(user.user_id, first.workspace_id)
        .await?;
    info!(
        user_id = %user.user_id,
        workspace_id = %first.workspace_id,
        "Activated first workspace"
    );

    let event = events::workspace_activated(
        first.workspace_id,
        &actor,
        &first.workspace_name,
        &first.role,
    )
    .with_origin(&origin);
    state.recorder.record(event).await;

    Ok(Json(ActiveWorkspaceResponse { data: first.into() }))
}
