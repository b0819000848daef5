//! Tests for database bootstrap
//!
//! Covers the startup sequence: ensure database → connect → migrate, and
//! restart behavior against an already-initialized database file.

use rollcall_common::db::{applied_migrations, bootstrap, run_migrations, MIGRATIONS};

#[tokio::test]
async fn test_bootstrap_creates_and_migrates_new_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("rollcall.db");

    let pool = bootstrap(&db_path).await.unwrap();

    assert!(db_path.exists(), "Database file was not created");

    let people_table: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='people')",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(people_table);

    let ledger = applied_migrations(&pool).await.unwrap();
    assert_eq!(ledger.len(), MIGRATIONS.len());
}

#[tokio::test]
async fn test_restart_keeps_data_and_applies_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("rollcall.db");

    let pool = bootstrap(&db_path).await.unwrap();
    sqlx::query(
        "INSERT INTO people (created_at, updated_at, name, surname)
         VALUES (datetime('now'), datetime('now'), 'Anna', 'Smith')",
    )
    .execute(&pool)
    .await
    .unwrap();
    let ledger_before = applied_migrations(&pool).await.unwrap();
    pool.close().await;

    // Simulated restart
    let pool = bootstrap(&db_path).await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM people")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(applied_migrations(&pool).await.unwrap(), ledger_before);
    assert_eq!(run_migrations(&pool, MIGRATIONS).await.unwrap(), 0);
}

#[tokio::test]
async fn test_bootstrap_fails_on_unwritable_location() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where a directory is expected
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let db_path = blocker.join("rollcall.db");

    assert!(bootstrap(&db_path).await.is_err());
}
