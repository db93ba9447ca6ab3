//! Leadbase Authentication Layer
//!
//! Bearer-token authentication for the Leadbase API:
//!
//! - **JWT access tokens**: HS256, issuer/audience checked, revocable
//! - **Session resolution**: [`SessionResolver`] maps a token to the user
//!   it was issued for and ends sessions on sign-out
//! - **Middleware**: [`AuthLayer`] attaches an [`AuthenticatedUser`] to the
//!   request; [`RequireAuth`] rejects requests without one
//!
//! ```text
//! Request → AuthMiddleware → SessionResolver → AuthenticatedUser → Handler
//! ```

pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod session;
pub mod types;

pub use config::JwtConfig;
pub use error::{AuthError, AuthResult, ErrorResponse};
pub use jwt::JwtService;
pub use middleware::{auth_error_response, AuthLayer, AuthMiddleware, RequireAuth};
pub use session::SessionResolver;
pub use types::*;

use std::sync::Arc;

/// Authentication service handed to the API layer
#[derive(Clone)]
pub struct AuthService {
    pub jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            jwt: Arc::new(JwtService::new(config)),
        }
    }

    /// The resolver used by the middleware and sign-out
    pub fn resolver(&self) -> Arc<dyn SessionResolver> {
        self.jwt.clone()
    }

    /// Create an auth layer for Axum router
    pub fn layer(&self) -> AuthLayer {
        AuthLayer::new(self.resolver())
    }
}
