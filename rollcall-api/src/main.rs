//! rollcall-api - person registry with name-based enrichment
//!
//! Startup order: `.env`, configuration, logging, database bootstrap (create +
//! migrate), then the HTTP listener. A bootstrap failure exits before
//! anything is bound.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rollcall_common::config::{resolve_config, ConfigOverrides};
use rollcall_common::db::bootstrap;
use rollcall_api::services::LookupClient;
use rollcall_api::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for rollcall-api
#[derive(Parser, Debug)]
#[command(name = "rollcall-api")]
#[command(about = "Person registry with age, gender and nationality enrichment")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "ROLLCALL_PORT")]
    port: Option<u16>,

    /// TOML configuration file
    #[arg(short, long, env = "ROLLCALL_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, env = "ROLLCALL_DATABASE")]
    database: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, env = "ROLLCALL_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A .env file may supply ROLLCALL_* variables; a missing file is fine
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = resolve_config(
        args.config.as_deref(),
        ConfigOverrides {
            database_path: args.database,
            port: args.port,
            log_level: args.log_level,
        },
    )
    .context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting rollcall-api v{}", env!("CARGO_PKG_VERSION"));
    info!("Database path: {}", config.database_path.display());

    let pool = match bootstrap(&config.database_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Database bootstrap failed: {}", e);
            return Err(e.into());
        }
    };

    let lookup = LookupClient::new(config.lookup).context("Failed to build lookup client")?;
    let state = AppState::new(pool, Arc::new(lookup));
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("rollcall-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
