//! Authentication error types
//!
//! Every 401 variant is reported to clients as the same `Unauthorized`
//! message, so a caller cannot tell an expired token from a forged one.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    // =========================================================================
    // Token Errors
    // =========================================================================
    /// Token has expired
    #[error("Token has expired")]
    TokenExpired,

    /// Token is invalid (malformed, wrong signature, etc.)
    #[error("Invalid token")]
    InvalidToken,

    /// Token has been revoked (signed out)
    #[error("Token has been revoked")]
    TokenRevoked,

    /// No bearer token on the request
    #[error("Authentication required")]
    Unauthenticated,

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not be exposed to clients)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::TokenExpired | Self::InvalidToken | Self::TokenRevoked | Self::Unauthenticated => {
                401
            }
            Self::Config(_) | Self::Internal(_) => 500,
        }
    }

    /// Get safe message for client (doesn't leak internal details)
    pub fn client_message(&self) -> String {
        match self.status_code() {
            401 => "Unauthorized".to_string(),
            _ => "An internal error occurred".to_string(),
        }
    }
}

/// Error body for API clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&AuthError> for ErrorResponse {
    fn from(error: &AuthError) -> Self {
        Self {
            error: error.client_message(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            _ => Self::InvalidToken,
        }
    }
}
