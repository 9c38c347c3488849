//! Database initialization
//!
//! Creates the observation database on first run and brings the schema up to
//! date on every start. All `CREATE` statements are idempotent.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open (creating if needed) the database at `db_path` and initialize the schema
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL allows concurrent readers alongside the single writer
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    init_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes on an already-open pool
///
/// Used directly by tests running against `sqlite::memory:`.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await?;

    create_observers_table(pool).await?;
    create_observations_table(pool).await?;
    create_validation_history_table(pool).await?;

    Ok(())
}

/// Community members who submit observations
pub async fn create_observers_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS observers (
            observer_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            role TEXT NOT NULL,
            location_lat REAL NOT NULL,
            location_lon REAL NOT NULL,
            total_observations INTEGER NOT NULL DEFAULT 0,
            accuracy_score REAL NOT NULL DEFAULT 0.5
                CHECK (accuracy_score >= 0.0 AND accuracy_score <= 1.0),
            verified INTEGER NOT NULL DEFAULT 0,
            registered_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Submitted observations
///
/// `observer_id` is deliberately not a foreign key: submissions from
/// unregistered observers are accepted and recorded as "Anonymous".
pub async fn create_observations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS observations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            observer_id TEXT NOT NULL,
            observer_name TEXT NOT NULL,
            location_lat REAL NOT NULL,
            location_lon REAL NOT NULL,
            category TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            confidence REAL NOT NULL,
            severity TEXT NOT NULL,
            submitted_at INTEGER NOT NULL,
            validation_state TEXT NOT NULL DEFAULT 'unvalidated'
                CHECK (validation_state IN ('unvalidated', 'valid', 'invalid')),
            validator_id TEXT,
            validated_at INTEGER,
            reliability_score REAL NOT NULL DEFAULT 0.0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_observations_state_category \
         ON observations(validation_state, category)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_observations_submitted_at \
         ON observations(submitted_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_observations_location \
         ON observations(location_lat, location_lon)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Append-only audit log of validation decisions
pub async fn create_validation_history_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS validation_history (
            validation_id INTEGER PRIMARY KEY AUTOINCREMENT,
            observation_id INTEGER NOT NULL REFERENCES observations(id),
            validator_id TEXT NOT NULL,
            validation_result TEXT NOT NULL
                CHECK (validation_result IN ('VALID', 'INVALID')),
            reliability_adjustment REAL NOT NULL DEFAULT 0.0,
            notes TEXT NOT NULL DEFAULT '',
            validated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_validation_history_observation \
         ON validation_history(observation_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
