//! JWT Token Service
//!
//! Issues and validates HS256 access tokens and keeps an in-process
//! revocation list so a signed-out token stops resolving immediately.
//! A revocation is kept only until the token would have expired anyway.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use leadbase_types::{Actor, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::{AuthError, AuthResult};
use crate::session::SessionResolver;
use crate::types::{AuthenticatedUser, IssuedToken, TokenClaims};

/// JWT service for token management
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Revoked token IDs (jti) with their `exp` timestamp
    revoked_tokens: Arc<RwLock<HashMap<String, i64>>>,
}

impl JwtService {
    /// Create a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
            revoked_tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Issue an access token for `actor`
    pub fn issue_access_token(&self, actor: &Actor) -> AuthResult<IssuedToken> {
        let now = Utc::now();
        let exp = now
            + Duration::from_std(self.config.access_token_lifetime)
                .map_err(|e| AuthError::Internal(e.to_string()))?;

        let claims = TokenClaims {
            sub: actor.id.to_string(),
            email: actor.email.clone(),
            name: actor.name.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to encode access token: {}", e)))?;

        Ok(IssuedToken {
            access_token,
            expires_at: exp.timestamp(),
            token_type: "Bearer".to_string(),
        })
    }

    /// Validate an access token and return claims
    pub async fn validate_access_token(&self, token: &str) -> AuthResult<TokenClaims> {
        let claims = self.decode_token(token)?;

        if self.is_token_revoked(&claims.jti).await {
            return Err(AuthError::TokenRevoked);
        }

        Ok(claims)
    }

    /// Revoke an access token until its expiry, dropping revocations of
    /// tokens that have expired since
    pub async fn revoke_token(&self, jti: &str, expires_at: i64) {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked_tokens.write().await;
        revoked.retain(|_, exp| *exp > now);
        if expires_at > now {
            revoked.insert(jti.to_string(), expires_at);
        }
    }

    /// Check if a token is revoked
    pub async fn is_token_revoked(&self, jti: &str) -> bool {
        let revoked = self.revoked_tokens.read().await;
        revoked.contains_key(jti)
    }

    /// Decode and validate a token
    fn decode_token(&self, token: &str) -> AuthResult<TokenClaims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let token_data = decode::<TokenClaims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}

#[async_trait]
impl SessionResolver for JwtService {
    async fn resolve(&self, token: &str) -> AuthResult<AuthenticatedUser> {
        let claims = self.validate_access_token(token).await?;
        let user_id = UserId::parse(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthenticatedUser {
            user_id,
            email: claims.email,
            name: claims.name,
            token_id: claims.jti,
            expires_at: claims.exp,
        })
    }

    async fn invalidate(&self, user: &AuthenticatedUser) -> AuthResult<()> {
        self.revoke_token(&user.token_id, user.expires_at).await;
        tracing::info!(user_id = %user.user_id, "Access token revoked");
        Ok(())
    }
}
