//! Database schema migrations
//!
//! Implements named, ledger-tracked schema migrations so the database can be
//! upgraded in place across restarts without manual intervention.
//!
//! # How it works
//!
//! Every step in [`MIGRATIONS`] has a stable name. The runner keeps a
//! `schema_migrations` ledger of step names that have been applied. On startup
//! each step not in the ledger runs inside its own transaction, and its ledger
//! row is inserted in that same transaction, so a step is either fully applied
//! and recorded or not applied at all.
//!
//! # Migration Guidelines
//!
//! 1. **Never rename or modify shipped migrations** - the ledger is keyed by name
//! 2. **Always append new migrations** - registry order is application order
//! 3. **Write idempotent steps** - use `IF NOT EXISTS` or check the catalogue first,
//!    the ledger is the only replay guard
//! 4. **Never depend on a later step** - a failed step stops the run
//!
//! # Example Migration
//!
//! ```rust,ignore
//! fn add_nickname(conn: &mut SqliteConnection) -> BoxFuture<'_, Result<(), sqlx::Error>> {
//!     Box::pin(async move {
//!         if !column_exists(&mut *conn, "people", "nickname").await? {
//!             sqlx::query("ALTER TABLE people ADD COLUMN nickname TEXT")
//!                 .execute(&mut *conn)
//!                 .await?;
//!         }
//!         Ok(())
//!     })
//! }
//! ```

use chrono::Utc;
use futures::future::BoxFuture;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{info, warn};

use super::models::MigrationRecord;

/// Schema-change operation run inside the step's transaction
pub type MigrationFn =
    for<'c> fn(&'c mut SqliteConnection) -> BoxFuture<'c, Result<(), sqlx::Error>>;

/// A single named schema change
#[derive(Clone, Copy)]
pub struct Migration {
    /// Stable ledger key, never renamed once shipped
    pub name: &'static str,
    pub apply: MigrationFn,
}

impl std::fmt::Debug for Migration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migration").field("name", &self.name).finish()
    }
}

/// Migration failures
///
/// Every variant is fatal to startup: the service must not run against a
/// partially migrated schema.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Duplicate migration name in registry: {0}")]
    DuplicateName(&'static str),

    #[error("Failed to prepare migration ledger: {0}")]
    Ledger(#[source] sqlx::Error),

    #[error("Failed to begin transaction for migration {name}: {source}")]
    Begin {
        name: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Migration {name} failed: {source}")]
    Step {
        name: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to record migration {name}: {source}")]
    Record {
        name: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to commit migration {name}: {source}")]
    Commit {
        name: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

/// Registry of schema migrations, in application order
///
/// **IMPORTANT:** Append only. Names are persisted in the ledger.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "001_create_people",
        apply: create_people,
    },
    Migration {
        name: "002_people_filter_indexes",
        apply: create_people_filter_indexes,
    },
    Migration {
        name: "003_people_folded_names",
        apply: add_folded_name_columns,
    },
];

/// Run all pending migrations in registry order
///
/// Returns the number of steps applied by this call (0 when the schema is
/// already up to date). Stops at the first failing step; later steps are not
/// attempted.
pub async fn run_migrations(
    pool: &SqlitePool,
    migrations: &[Migration],
) -> Result<usize, MigrationError> {
    validate_registry(migrations)?;
    create_ledger_table(pool).await.map_err(MigrationError::Ledger)?;

    let applied: HashSet<String> =
        sqlx::query_scalar::<_, String>("SELECT name FROM schema_migrations")
            .fetch_all(pool)
            .await
            .map_err(MigrationError::Ledger)?
            .into_iter()
            .collect();

    let pending = migrations
        .iter()
        .filter(|m| !applied.contains(m.name))
        .count();

    if pending == 0 {
        info!("Database schema is up to date ({} migrations)", applied.len());
        return Ok(0);
    }

    info!("Running {} pending database migration(s)", pending);

    let mut applied_count = 0;
    for migration in migrations {
        if applied.contains(migration.name) {
            continue;
        }

        apply_migration(pool, migration).await?;
        applied_count += 1;
        info!("✓ Migration {} completed", migration.name);
    }

    info!("All migrations completed successfully");
    Ok(applied_count)
}

/// List ledger entries in the order they were applied
pub async fn applied_migrations(pool: &SqlitePool) -> Result<Vec<MigrationRecord>, sqlx::Error> {
    create_ledger_table(pool).await?;

    sqlx::query_as::<_, MigrationRecord>(
        "SELECT name, applied_at FROM schema_migrations ORDER BY id",
    )
    .fetch_all(pool)
    .await
}

fn validate_registry(migrations: &[Migration]) -> Result<(), MigrationError> {
    let mut seen = HashSet::new();
    for migration in migrations {
        if !seen.insert(migration.name) {
            return Err(MigrationError::DuplicateName(migration.name));
        }
    }
    Ok(())
}

async fn create_ledger_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Apply one step and record it, all in a single transaction
async fn apply_migration(pool: &SqlitePool, migration: &Migration) -> Result<(), MigrationError> {
    let name = migration.name;
    info!("Running migration {}", name);

    let mut tx = pool
        .begin()
        .await
        .map_err(|source| MigrationError::Begin { name, source })?;

    let result = (migration.apply)(&mut *tx).await;
    if let Err(source) = result {
        if let Err(e) = tx.rollback().await {
            warn!("Rollback of migration {} failed: {}", name, e);
        }
        return Err(MigrationError::Step { name, source });
    }

    let result = sqlx::query("INSERT INTO schema_migrations (name, applied_at) VALUES (?, ?)")
        .bind(name)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await;
    if let Err(source) = result {
        if let Err(e) = tx.rollback().await {
            warn!("Rollback of migration {} failed: {}", name, e);
        }
        return Err(MigrationError::Record { name, source });
    }

    tx.commit()
        .await
        .map_err(|source| MigrationError::Commit { name, source })
}

/// Migration 001: people table
///
/// `deleted_at` is indexed because every read filters on it.
fn create_people(conn: &mut SqliteConnection) -> BoxFuture<'_, Result<(), sqlx::Error>> {
    Box::pin(async move {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS people (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL,
                deleted_at TIMESTAMP,
                name TEXT NOT NULL,
                surname TEXT NOT NULL,
                patronymic TEXT,
                age INTEGER,
                gender TEXT,
                country TEXT
            )
            "#,
        )
        .execute(&mut *conn)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_people_deleted_at ON people(deleted_at)")
            .execute(&mut *conn)
            .await?;

        Ok(())
    })
}

/// Migration 002: indexes for the exact-match list filters
fn create_people_filter_indexes(
    conn: &mut SqliteConnection,
) -> BoxFuture<'_, Result<(), sqlx::Error>> {
    Box::pin(async move {
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_people_gender ON people(gender)")
            .execute(&mut *conn)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_people_country ON people(country)")
            .execute(&mut *conn)
            .await?;

        Ok(())
    })
}

/// Lowercase form used for case-insensitive name matching
///
/// SQLite's `lower()` and `LIKE` only fold ASCII, so folding happens in Rust.
pub fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

async fn column_exists(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) > 0 FROM pragma_table_info(?) WHERE name = ?")
        .bind(table)
        .bind(column)
        .fetch_one(&mut *conn)
        .await
}

/// Migration 003: lowercased name columns for the substring filters
///
/// Existing rows are backfilled.
fn add_folded_name_columns(conn: &mut SqliteConnection) -> BoxFuture<'_, Result<(), sqlx::Error>> {
    Box::pin(async move {
        for column in ["name_folded", "surname_folded"] {
            if !column_exists(&mut *conn, "people", column).await? {
                sqlx::query(&format!("ALTER TABLE people ADD COLUMN {} TEXT", column))
                    .execute(&mut *conn)
                    .await?;
            }
        }

        let rows: Vec<(i64, String, String)> =
            sqlx::query_as("SELECT id, name, surname FROM people")
                .fetch_all(&mut *conn)
                .await?;

        for (id, name, surname) in rows {
            sqlx::query("UPDATE people SET name_folded = ?, surname_folded = ? WHERE id = ?")
                .bind(fold_case(&name))
                .bind(fold_case(&surname))
                .bind(id)
                .execute(&mut *conn)
                .await?;
        }

        Ok(())
    })
}
