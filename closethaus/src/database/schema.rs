//! Store schema
//!
//! Collection tables are created by numbered migrations recorded in the
//! `migrations` table. Each migration runs in its own transaction, and a
//! store written by a newer build is refused rather than modified.

use crate::error::{AppError, Result};
use sqlx::sqlite::SqlitePool;
use sqlx::Executor;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: include_str!("migrations/001_initial_schema.sql"),
}];

/// Newest schema version this build knows
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

/// Bring the store up to [`latest_version`]
pub async fn initialize_database(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    let current = schema_version(pool).await?;
    if current > latest_version() {
        return Err(AppError::StorageUnavailable(format!(
            "store schema version {} is newer than supported version {}",
            current,
            latest_version()
        )));
    }

    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();
    if pending.is_empty() {
        tracing::debug!("Store schema is current (version {})", current);
        return Ok(());
    }

    for migration in pending {
        apply(pool, migration).await?;
    }

    Ok(())
}

async fn schema_version(pool: &SqlitePool) -> Result<i64> {
    let version: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM migrations")
        .fetch_one(pool)
        .await?;
    Ok(version)
}

async fn apply(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    tracing::info!("Applying store migration {} ({})", migration.version, migration.name);

    let mut tx = pool.begin().await?;

    (&mut *tx).execute(sqlx::raw_sql(migration.sql)).await?;
    sqlx::query("INSERT INTO migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}
