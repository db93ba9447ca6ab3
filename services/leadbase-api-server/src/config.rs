//! Server Configuration
//!
//! Layered configuration for the Leadbase API server: an optional file,
//! `config/default` and `config/local`, then `LEADBASE__SECTION__KEY`
//! environment variables. CLI arguments are applied on top in `main`.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use leadbase_activity::ActivityConfig;
use leadbase_api::ApiConfig;
use leadbase_auth::JwtConfig;
use leadbase_db::DatabaseConfig;

/// Server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSettings,
    pub database: DatabaseConfig,
    pub auth: JwtConfig,
    pub activity: ActivityConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

/// Server binding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Grace period for in-flight requests after a shutdown signal
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_timeout_secs: 10,
        }
    }
}

impl ServerSettings {
    /// Socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address {}:{}: {}", self.host, self.port, e))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    pub level: String,
    /// `json` or `pretty`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Prometheus exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Port of the standalone exporter listener
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 9090,
        }
    }
}

impl ServerConfig {
    /// Load configuration from files and environment
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("LEADBASE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Configuration for local development
    pub fn development() -> Self {
        Self {
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: "pretty".to_string(),
            },
            metrics: MetricsConfig {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.activity.cooling_period, Duration::from_secs(3600));
        assert!(config.auth.has_placeholder_secret());
        assert_eq!(
            config.server.socket_addr().unwrap(),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_invalid_bind_address() {
        let settings = ServerSettings {
            host: "not a host".into(),
            ..Default::default()
        };
        assert!(settings.socket_addr().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let source = r#"
            [server]
            port = 9000

            [activity]
            cooling_period = "15m"

            [auth]
            secret = "a-real-secret"
        "#;
        let config: ServerConfig = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.activity.cooling_period, Duration::from_secs(900));
        assert_eq!(config.activity.max_page_size, 100);
        assert!(!config.auth.has_placeholder_secret());
        assert_eq!(config.logging.format, "pretty");
    }
}
