//! Authentication types

use leadbase_types::{Actor, UserId};
use serde::{Deserialize, Serialize};

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// User email
    pub email: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Token ID, used for revocation
    pub jti: String,
}

/// A freshly issued access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    pub access_token: String,
    /// Expiry (Unix timestamp)
    pub expires_at: i64,
    /// Token type (always "Bearer")
    pub token_type: String,
}

/// The principal resolved from a bearer token, attached to request
/// extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email: String,
    pub name: Option<String>,
    /// `jti` of the presented token
    pub token_id: String,
    /// Expiry of the presented token (Unix timestamp)
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// The acting principal passed to the activity core.
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.user_id,
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}
