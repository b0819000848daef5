//! Database bootstrap
//!
//! Startup sequence run once before the HTTP listener is bound:
//! 1. Ensure the database exists (create it if missing)
//! 2. Open the connection pool
//! 3. Apply pending schema migrations
//!
//! Any failure here is fatal; the service must not serve requests against a
//! missing or partially migrated database.

use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use super::migrations::{run_migrations, MigrationError, MIGRATIONS};

/// Bootstrap failures (all fatal to startup)
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Failed to create database directory {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to check whether database {url} exists: {source}")]
    ExistenceCheck {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to create database {url}: {source}")]
    Create {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to connect to database {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Migration(#[from] MigrationError),
}

/// Connection URL for a SQLite database file
pub fn database_url(db_path: &Path) -> String {
    format!("sqlite://{}", db_path.display())
}

/// Create the database if it does not exist yet
///
/// Asks the driver's administrative interface whether the database exists and
/// issues a create only when it is absent. Returns `true` if this call created it.
///
/// Two processes bootstrapping the same database at once are not coordinated;
/// the check and the create are separate operations.
pub async fn ensure_database(db_path: &Path) -> Result<bool, BootstrapError> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| BootstrapError::Directory {
            path: parent.display().to_string(),
            source,
        })?;
    }

    let url = database_url(db_path);

    let exists = Sqlite::database_exists(&url)
        .await
        .map_err(|source| BootstrapError::ExistenceCheck {
            url: url.clone(),
            source,
        })?;

    if exists {
        info!("Opened existing database: {}", db_path.display());
        return Ok(false);
    }

    Sqlite::create_database(&url)
        .await
        .map_err(|source| BootstrapError::Create {
            url: url.clone(),
            source,
        })?;

    info!("Created database: {}", db_path.display());
    Ok(true)
}

/// Open a connection pool to an existing database file
pub async fn connect(db_path: &Path) -> Result<SqlitePool, BootstrapError> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
        .map_err(|source| BootstrapError::Connect {
            url: database_url(db_path),
            source,
        })
}

/// Full startup sequence: ensure database, connect, migrate
pub async fn bootstrap(db_path: &Path) -> Result<SqlitePool, BootstrapError> {
    ensure_database(db_path).await?;

    let pool = connect(db_path).await?;
    info!("Database connection established");

    run_migrations(&pool, MIGRATIONS).await?;

    Ok(pool)
}
