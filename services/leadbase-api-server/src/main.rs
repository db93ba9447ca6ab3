//! Leadbase API Server
//!
//! Serves the workspace activity log API: recording member actions,
//! listing and aggregating them, plus the sign-out and active-workspace
//! endpoints that log session events as a side effect.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings
//! leadbase-api-server
//!
//! # Start with custom config
//! leadbase-api-server --config /path/to/config.toml
//!
//! # Start with environment overrides
//! LEADBASE__SERVER__PORT=9000 leadbase-api-server
//! ```

mod config;

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tokio::sync::Notify;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use leadbase_api::{create_router, AppState};
use leadbase_auth::AuthService;
use leadbase_db::Database;

use crate::config::ServerConfig;

/// Leadbase API Server
#[derive(Parser, Debug)]
#[command(name = "leadbase-api-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "LEADBASE_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "LEADBASE_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "LEADBASE_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LEADBASE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "LEADBASE_LOG_FORMAT")]
    log_format: Option<String>,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// JWT secret key
    #[arg(long, env = "JWT_SECRET")]
    jwt_secret: Option<String>,

    /// Enable development mode (allows the placeholder JWT secret)
    #[arg(long, env = "LEADBASE_DEV_MODE")]
    dev_mode: bool,
}

impl Args {
    /// Apply CLI overrides on top of the loaded configuration
    fn apply(self, config: &mut ServerConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Some(url) = self.database_url {
            config.database.postgres_url = url;
        }
        if let Some(secret) = self.jwt_secret {
            config.auth.secret = secret;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let dev_mode = args.dev_mode;

    let mut server_config = ServerConfig::load(args.config.as_deref())?;
    args.apply(&mut server_config);

    init_logging(&server_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Leadbase API Server"
    );

    validate_config(&server_config, dev_mode)?;

    let db = init_database(&server_config.database).await?;
    let auth = AuthService::new(server_config.auth.clone());

    let state = Arc::new(AppState::from_database(
        &db,
        &auth,
        server_config.activity.clone(),
    ));
    let app = create_router(state, server_config.api.clone());

    if server_config.metrics.enabled {
        start_metrics_server(&server_config.metrics)?;
    }

    let addr = server_config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        host = %server_config.server.host,
        port = %server_config.server.port,
        "Server listening"
    );

    let shutdown = Arc::new(Notify::new());
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            shutdown.notify_one();
        }
    });

    drain_within(
        server.into_future(),
        &shutdown,
        server_config.server.shutdown_timeout(),
    )
    .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => subscriber
            .with(fmt::layer().json().with_target(true))
            .try_init()?,
        _ => subscriber
            .with(fmt::layer().pretty().with_target(true))
            .try_init()?,
    }

    Ok(())
}

/// Refuse settings that are only acceptable during development
fn validate_config(config: &ServerConfig, dev_mode: bool) -> anyhow::Result<()> {
    if config.auth.has_placeholder_secret() {
        if !dev_mode {
            anyhow::bail!(
                "JWT secret must be changed outside development. Set JWT_SECRET or LEADBASE__AUTH__SECRET."
            );
        }
        tracing::warn!("Using placeholder JWT secret (dev mode)");
    }

    if config.activity.max_page_size < config.activity.default_page_size {
        anyhow::bail!(
            "activity.max_page_size ({}) is below activity.default_page_size ({})",
            config.activity.max_page_size,
            config.activity.default_page_size
        );
    }

    Ok(())
}

/// Connect, migrate and probe the database
async fn init_database(config: &leadbase_db::DatabaseConfig) -> anyhow::Result<Database> {
    let db = Database::connect(config).await?;

    if config.run_migrations {
        db.migrate().await?;
    }

    let health = db.health_check().await;
    if !health.healthy {
        anyhow::bail!("Database health check failed");
    }

    tracing::info!(postgres = health.postgres, "Database health check passed");

    Ok(db)
}

/// Install the Prometheus recorder with its own HTTP listener
fn start_metrics_server(config: &config::MetricsConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(port = config.port, "Metrics exporter started");

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

/// Run `server` until it exits. Once `shutdown` fires, in-flight requests
/// get at most `timeout` to finish before the server is dropped.
async fn drain_within<F>(server: F, shutdown: &Notify, timeout: Duration) -> anyhow::Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return Ok(result?),
        _ = shutdown.notified() => {}
    }

    tracing::info!(
        timeout_secs = timeout.as_secs(),
        "Waiting for in-flight requests to complete..."
    );

    match tokio::time::timeout(timeout, server).await {
        Ok(result) => Ok(result?),
        Err(_) => {
            tracing::warn!(
                timeout_secs = timeout.as_secs(),
                "Shutdown timeout elapsed, dropping remaining connections"
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["leadbase-api-server", "--port", "9000", "--dev-mode"]);
        assert_eq!(args.port, Some(9000));
        assert!(args.dev_mode);
    }

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::parse_from([
            "leadbase-api-server",
            "--host",
            "127.0.0.1",
            "--log-format",
            "json",
            "--jwt-secret",
            "from-cli",
        ]);
        let mut config = ServerConfig::development();
        args.apply(&mut config);

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.auth.secret, "from-cli");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_placeholder_secret_requires_dev_mode() {
        let config = ServerConfig::development();
        assert!(validate_config(&config, false).is_err());
        assert!(validate_config(&config, true).is_ok());

        let mut config = ServerConfig::development();
        config.auth.secret = "a-real-secret-with-enough-entropy".into();
        assert!(validate_config(&config, false).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_is_capped_by_timeout() {
        let shutdown = Notify::new();
        shutdown.notify_one();
        let started = tokio::time::Instant::now();

        let result = drain_within(
            std::future::pending::<std::io::Result<()>>(),
            &shutdown,
            Duration::from_secs(10),
        )
        .await;

        assert!(result.is_ok());
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(10) && elapsed < Duration::from_secs(11));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_returns_as_soon_as_server_exits() {
        let shutdown = Notify::new();
        shutdown.notify_one();
        let started = tokio::time::Instant::now();

        let server = async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(())
        };
        drain_within(server, &shutdown, Duration::from_secs(30))
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_page_size_consistency() {
        let mut config = ServerConfig::development();
        config.auth.secret = "a-real-secret-with-enough-entropy".into();
        config.activity.max_page_size = 10;
        assert!(validate_config(&config, false).is_err());
    }
}
