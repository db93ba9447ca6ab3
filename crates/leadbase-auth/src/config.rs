//! Authentication configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Secret shipped in sample configuration. Refused outside dev mode.
pub const PLACEHOLDER_SECRET: &str = "change-me-in-production";

/// JWT token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Secret key for signing tokens (should be at least 256 bits)
    pub secret: String,
    /// Access token lifetime
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,
    /// Token issuer claim
    pub issuer: String,
    /// Token audience claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: PLACEHOLDER_SECRET.to_string(),
            access_token_lifetime: Duration::from_secs(60 * 60), // 1 hour
            issuer: "leadbase".to_string(),
            audience: "leadbase-api".to_string(),
        }
    }
}

impl JwtConfig {
    /// Whether the signing secret is unset or still the sample value
    pub fn has_placeholder_secret(&self) -> bool {
        self.secret.is_empty() || self.secret == PLACEHOLDER_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_secret_is_placeholder() {
        assert!(JwtConfig::default().has_placeholder_secret());

        let config = JwtConfig {
            secret: "a-real-secret-with-enough-entropy-0123456789".into(),
            ..Default::default()
        };
        assert!(!config.has_placeholder_secret());
    }

    #[test]
    fn test_lifetime_parses_humantime() {
        let config: JwtConfig =
            serde_json::from_str(r#"{"secret":"s","access_token_lifetime":"15m"}"#).unwrap();
        assert_eq!(config.access_token_lifetime, Duration::from_secs(900));
        assert_eq!(config.issuer, "leadbase");
    }
}
