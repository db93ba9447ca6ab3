//! API error handling
//!
//! Every error leaves the API as `{"error": "<message>"}` with the status
//! code of its variant.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use leadbase_activity::ActivityError;
use leadbase_auth::AuthError;
use leadbase_db::DbError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Request Errors
    // =========================================================================
    #[error("{0}")]
    BadRequest(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid request body")]
    InvalidRequestBody,

    // =========================================================================
    // Authentication / Authorization
    // =========================================================================
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    // =========================================================================
    // Resource Errors
    // =========================================================================
    #[error("{0}")]
    NotFound(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Message is returned to the client as-is
    #[error("{0}")]
    Internal(String),

    #[error("Service unavailable")]
    ServiceUnavailable,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::UnknownAction(_) | Self::InvalidRequestBody => {
                StatusCode::BAD_REQUEST
            }
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Error body returned by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorResponse::from(&self))).into_response()
    }
}

impl From<ActivityError> for ApiError {
    fn from(err: ActivityError) -> Self {
        match err {
            ActivityError::Validation(msg) => Self::BadRequest(msg),
            ActivityError::AccessDenied => {
                Self::Forbidden(ActivityError::AccessDenied.to_string())
            }
            ActivityError::Store(e) => e.into(),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        tracing::error!(error = ?err, "Database error");
        Self::Internal(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err.status_code() {
            401 => Self::Unauthorized,
            _ => {
                tracing::error!(error = %err, "Authentication service error");
                Self::Internal(err.client_message())
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(_: serde_json::Error) -> Self {
        Self::InvalidRequestBody
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_maps_to_forbidden() {
        let err = ApiError::from(ActivityError::AccessDenied);
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.to_string(), "You don't have access to this workspace");
    }

    #[test]
    fn test_store_error_keeps_message() {
        let err = ApiError::from(ActivityError::Store(DbError::Unavailable("down".into())));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("down"));
    }

    #[test]
    fn test_auth_errors_are_unauthorized() {
        let err = ApiError::from(AuthError::TokenRevoked);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ErrorResponse::from(&err).error,
            "Unauthorized".to_string()
        );
    }

    #[test]
    fn test_unknown_action_message() {
        let err = ApiError::UnknownAction("dance".into());
        assert_eq!(err.to_string(), "Unknown action: dance");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
