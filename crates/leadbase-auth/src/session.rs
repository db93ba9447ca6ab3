//! Session resolution
//!
//! The identity provider is opaque to the rest of the system: handlers only
//! see `token -> AuthenticatedUser` and a way to end the session.

use async_trait::async_trait;

use crate::error::AuthResult;
use crate::types::AuthenticatedUser;

#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Resolve a bearer token to the user it was issued for.
    async fn resolve(&self, token: &str) -> AuthResult<AuthenticatedUser>;

    /// End the session the user authenticated with. After this returns,
    /// `resolve` no longer accepts that token.
    async fn invalidate(&self, user: &AuthenticatedUser) -> AuthResult<()>;
}
