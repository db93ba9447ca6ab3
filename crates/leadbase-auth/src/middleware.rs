//! Authentication Middleware for Axum
//!
//! Resolves `Authorization: Bearer <token>` through a [`SessionResolver`]
//! and attaches the [`AuthenticatedUser`] to request extensions. Requests
//! without a bearer token pass through untouched; handlers decide whether
//! authentication is required. A token that is present but does not
//! resolve is answered with 401 immediately.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::Response,
};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::error::{AuthError, ErrorResponse};
use crate::session::SessionResolver;
use crate::types::AuthenticatedUser;

/// Authentication middleware layer
#[derive(Clone)]
pub struct AuthLayer {
    resolver: Arc<dyn SessionResolver>,
}

impl AuthLayer {
    /// Create a new authentication layer
    pub fn new(resolver: Arc<dyn SessionResolver>) -> Self {
        Self { resolver }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            resolver: self.resolver.clone(),
        }
    }
}

/// Authentication middleware service
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    resolver: Arc<dyn SessionResolver>,
}

impl<S> Service<Request> for AuthMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let resolver = self.resolver.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let auth_result = authenticate_request(req.headers(), resolver.as_ref()).await;

            match auth_result {
                Ok(user) => {
                    let (mut parts, body) = req.into_parts();
                    parts.extensions.insert(user);
                    inner.call(Request::from_parts(parts, body)).await
                }
                Err(AuthError::Unauthenticated) => inner.call(req).await,
                Err(e) => {
                    tracing::debug!(error = %e, "Rejected bearer token");
                    Ok(auth_error_response(e))
                }
            }
        })
    }
}

/// Extract the token from an `Authorization: Bearer` header
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AuthError::InvalidToken)?;
    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim())),
        _ => Err(AuthError::InvalidToken),
    }
}

async fn authenticate_request(
    headers: &HeaderMap,
    resolver: &dyn SessionResolver,
) -> Result<AuthenticatedUser, AuthError> {
    match bearer_token(headers)? {
        Some(token) => resolver.resolve(token).await,
        None => Err(AuthError::Unauthenticated),
    }
}

/// Create error response for authentication errors
pub fn auth_error_response(error: AuthError) -> Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = serde_json::to_string(&ErrorResponse::from(&error)).unwrap_or_default();

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

// =============================================================================
// Axum Extractors
// =============================================================================

/// Extractor for required authenticated user
/// Returns 401 if not authenticated
pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or_else(|| auth_error_response(AuthError::Unauthenticated))
    }
}
