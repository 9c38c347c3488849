//! Observer registration and lookup

use coastal_common::time::{from_millis, now, to_millis};
use coastal_common::{Error, Location, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, info};

use super::ObservationStore;
use crate::models::{Observer, ObserverRole, DEFAULT_ACCURACY_SCORE};

pub(super) const INCREMENT_OBSERVER_COUNT: &str =
    "UPDATE observers SET total_observations = total_observations + 1 WHERE observer_id = ?";

impl ObservationStore {
    /// Register an observer if the id is not already known
    ///
    /// Re-registering an existing id is a no-op, not an error. Returns `true`
    /// when a new row was inserted.
    pub async fn register_observer(
        &self,
        observer_id: &str,
        name: &str,
        role: ObserverRole,
        location: Location,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO observers
                (observer_id, name, role, location_lat, location_lon, accuracy_score, registered_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(observer_id)
        .bind(name)
        .bind(role.as_str())
        .bind(location.lat)
        .bind(location.lon)
        .bind(DEFAULT_ACCURACY_SCORE)
        .bind(to_millis(now()))
        .execute(self.pool())
        .await?;

        let inserted = result.rows_affected() > 0;
        if inserted {
            info!("Registered observer {} ({}, {})", observer_id, name, role);
        } else {
            debug!("Observer {} already registered, skipping", observer_id);
        }

        Ok(inserted)
    }

    /// Load an observer by id
    pub async fn get_observer(&self, observer_id: &str) -> Result<Option<Observer>> {
        let row = sqlx::query(
            r#"
            SELECT observer_id, name, role, location_lat, location_lon,
                   total_observations, accuracy_score, verified, registered_at
            FROM observers
            WHERE observer_id = ?
            "#,
        )
        .bind(observer_id)
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(observer_from_row).transpose()
    }

    /// Bump an observer's submission counter
    ///
    /// Returns `false` when the observer is not registered.
    pub async fn increment_observer_count(&self, observer_id: &str) -> Result<bool> {
        let result = sqlx::query(INCREMENT_OBSERVER_COUNT)
            .bind(observer_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Display name of an observer, if registered
    pub async fn observer_name(&self, observer_id: &str) -> Result<Option<String>> {
        let name: Option<String> =
            sqlx::query_scalar("SELECT name FROM observers WHERE observer_id = ?")
                .bind(observer_id)
                .fetch_optional(self.pool())
                .await?;
        Ok(name)
    }
}

fn observer_from_row(row: &SqliteRow) -> Result<Observer> {
    let role: String = row.try_get("role")?;
    let role = role
        .parse::<ObserverRole>()
        .map_err(|e| Error::Internal(format!("Corrupt observer row: {}", e)))?;
    let verified: i64 = row.try_get("verified")?;

    Ok(Observer {
        observer_id: row.try_get("observer_id")?,
        name: row.try_get("name")?,
        role,
        location: Location::new(row.try_get("location_lat")?, row.try_get("location_lon")?),
        total_observations: row.try_get("total_observations")?,
        accuracy_score: row.try_get("accuracy_score")?,
        verified: verified != 0,
        registered_at: from_millis(row.try_get("registered_at")?),
    })
}
