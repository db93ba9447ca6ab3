//! Session endpoint
//!
//! `/api/auth?action=signout` ends the caller's session and records a
//! `logout` entry in their active workspace. The workspace is looked up
//! before the token is revoked; once revoked, the identity is gone.

use axum::{
    extract::{Query, State},
    Json,
};
use http::Method;
use leadbase_activity::events;
use leadbase_auth::{AuthenticatedUser, RequireAuth};
use leadbase_types::RequestOrigin;
use std::sync::Arc;
use tracing::{info, warn};

use crate::dto::{ActionQuery, SignOutResponse};
use crate::error::{ApiError, ApiResult, ErrorResponse};
use crate::extractors::ClientOrigin;
use crate::state::AppState;

pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    method: Method,
    ClientOrigin(origin): ClientOrigin,
    Query(query): Query<ActionQuery>,
) -> ApiResult<Json<SignOutResponse>> {
    match (method, query.action()) {
        (Method::POST, "signout") => signout(&state, &user, origin).await,
        (Method::POST, action) => Err(ApiError::UnknownAction(action.to_string())),
        _ => Err(ApiError::MethodNotAllowed),
    }
}

/// Sign out and record the logout
///
/// Succeeds whether or not the logout entry could be written.
#[utoipa::path(
    post,
    path = "/api/auth?action=signout",
    tag = "Authentication",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Signed out", body = SignOutResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn signout(
    state: &AppState,
    user: &AuthenticatedUser,
    origin: RequestOrigin,
) -> ApiResult<Json<SignOutResponse>> {
    let workspace = match state.directory.active_membership(user.user_id).await {
        Ok(workspace) => workspace,
        Err(e) => {
            warn!(
                user_id = %user.user_id,
                error = %e,
                "Active workspace lookup failed, logout will not be logged"
            );
            None
        }
    };

    state.sessions.invalidate(user).await?;
    info!(user_id = %user.user_id, "User signed out");

    match workspace {
        Some(ws) => {
            let event = events::logout(ws.workspace_id, &user.actor(), Some(&ws.workspace_name))
                .with_origin(&origin);
            state.recorder.record(event).await;
        }
        None => info!(user_id = %user.user_id, "No active workspace, logout not logged"),
    }

    Ok(Json(SignOutResponse::default()))
}
