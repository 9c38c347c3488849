//! Observation store
//!
//! Durable record of observers, observations and validation history backed
//! by SQLite. Every write is committed before the call returns, so readers
//! always see their own writes.

pub mod observations;
pub mod observers;
pub mod validation_history;

pub use observations::{ObservationFilter, ObservationOrder};

use coastal_common::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Handle to the observation database
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct ObservationStore {
    pool: SqlitePool,
}

impl ObservationStore {
    /// Wrap an already-initialized pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database file and initialize the schema
    pub async fn open(db_path: &Path) -> Result<Self> {
        let pool = coastal_common::db::init_database(db_path).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
