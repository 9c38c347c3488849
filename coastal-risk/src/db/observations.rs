//! Observation persistence and windowed queries

use chrono::{DateTime, Utc};
use coastal_common::time::{from_millis, to_millis};
use coastal_common::{BoundingBox, Error, Location, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::{debug, info};

use super::observers::INCREMENT_OBSERVER_COUNT;
use super::ObservationStore;
use crate::models::{NewObservation, Observation, ObservationCategory, Severity, ValidationState};

const OBSERVATION_COLUMNS: &str = "id, observer_id, observer_name, location_lat, location_lon, \
     category, description, confidence, severity, submitted_at, validation_state, \
     validator_id, validated_at, reliability_score";

/// Result ordering for observation queries
///
/// The two modes serve different callers: aggregation walks the most
/// trusted observations first, listings show the newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObservationOrder {
    /// Highest reliability first, newest first among ties
    ReliabilityDesc,
    /// Newest submission first
    #[default]
    RecencyDesc,
}

/// Filter for [`ObservationStore::query_observations`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationFilter {
    /// Inclusive latitude/longitude window
    pub bounds: Option<BoundingBox>,
    /// Exclusive lower bound on submission time
    pub since: Option<DateTime<Utc>>,
    /// Only observations whose validation state is `valid`
    pub validated_only: bool,
    /// Inclusive lower bound on reliability score
    pub min_reliability: Option<f64>,
    pub category: Option<ObservationCategory>,
    /// Skip this observation id (used for corroboration counts)
    pub exclude_id: Option<i64>,
    pub order: ObservationOrder,
    pub limit: Option<i64>,
}

impl ObservationFilter {
    /// Filter matching validated observations only
    pub fn validated() -> Self {
        Self {
            validated_only: true,
            ..Self::default()
        }
    }

    pub fn within(mut self, bounds: BoundingBox) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn min_reliability(mut self, min: f64) -> Self {
        self.min_reliability = Some(min);
        self
    }

    pub fn category(mut self, category: Option<ObservationCategory>) -> Self {
        self.category = category;
        self
    }

    pub fn excluding(mut self, id: i64) -> Self {
        self.exclude_id = Some(id);
        self
    }

    pub fn order_by(mut self, order: ObservationOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    fn push_conditions(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" WHERE 1 = 1");

        if let Some(bounds) = self.bounds {
            qb.push(" AND location_lat BETWEEN ")
                .push_bind(bounds.lat_min)
                .push(" AND ")
                .push_bind(bounds.lat_max);
            qb.push(" AND location_lon BETWEEN ")
                .push_bind(bounds.lon_min)
                .push(" AND ")
                .push_bind(bounds.lon_max);
        }
        if let Some(since) = self.since {
            qb.push(" AND submitted_at > ").push_bind(to_millis(since));
        }
        if self.validated_only {
            qb.push(" AND validation_state = ")
                .push_bind(ValidationState::Valid.as_str());
        }
        if let Some(min) = self.min_reliability {
            qb.push(" AND reliability_score >= ").push_bind(min);
        }
        if let Some(category) = self.category {
            qb.push(" AND category = ").push_bind(category.as_str());
        }
        if let Some(id) = self.exclude_id {
            qb.push(" AND id != ").push_bind(id);
        }
    }
}

impl ObservationStore {
    /// Insert an observation and bump the submitting observer's counter
    ///
    /// Both writes happen in one transaction. The counter update matches no
    /// row for unregistered observers. Returns the new observation id.
    pub async fn insert_observation(&self, observation: &NewObservation) -> Result<i64> {
        let mut tx = self.pool().begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO observations (
                observer_id, observer_name, location_lat, location_lon, category,
                description, confidence, severity, submitted_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&observation.observer_id)
        .bind(&observation.observer_name)
        .bind(observation.location.lat)
        .bind(observation.location.lon)
        .bind(observation.category.as_str())
        .bind(&observation.description)
        .bind(observation.confidence)
        .bind(observation.severity.as_str())
        .bind(to_millis(observation.submitted_at))
        .execute(&mut *tx)
        .await?;

        let observation_id = result.last_insert_rowid();

        sqlx::query(INCREMENT_OBSERVER_COUNT)
            .bind(&observation.observer_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            "Stored observation {} ({}, {}) from {}",
            observation_id, observation.category, observation.severity, observation.observer_id
        );

        Ok(observation_id)
    }

    /// Load an observation by id
    pub async fn get_observation(&self, observation_id: i64) -> Result<Option<Observation>> {
        let sql = format!("SELECT {} FROM observations WHERE id = ?", OBSERVATION_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(observation_id)
            .fetch_optional(self.pool())
            .await?;

        row.as_ref().map(observation_from_row).transpose()
    }

    /// Observations matching `filter`, in the filter's ordering mode
    pub async fn query_observations(&self, filter: &ObservationFilter) -> Result<Vec<Observation>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM observations",
            OBSERVATION_COLUMNS
        ));
        filter.push_conditions(&mut qb);

        match filter.order {
            ObservationOrder::ReliabilityDesc => {
                qb.push(" ORDER BY reliability_score DESC, submitted_at DESC, id DESC");
            }
            ObservationOrder::RecencyDesc => {
                qb.push(" ORDER BY submitted_at DESC, id DESC");
            }
        }
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }

        let rows = qb.build().fetch_all(self.pool()).await?;
        let observations = rows
            .iter()
            .map(observation_from_row)
            .collect::<Result<Vec<_>>>()?;

        debug!("Observation query matched {} rows", observations.len());
        Ok(observations)
    }

    /// Number of observations matching `filter` (ordering and limit ignored)
    pub async fn count_observations(&self, filter: &ObservationFilter) -> Result<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM observations");
        filter.push_conditions(&mut qb);

        let count = qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    /// Persist a recomputed reliability score
    pub async fn update_reliability(&self, observation_id: i64, score: f64) -> Result<()> {
        let result = sqlx::query("UPDATE observations SET reliability_score = ? WHERE id = ?")
            .bind(score)
            .bind(observation_id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("observation {}", observation_id)));
        }

        Ok(())
    }
}

fn observation_from_row(row: &SqliteRow) -> Result<Observation> {
    let category: String = row.try_get("category")?;
    let severity: String = row.try_get("severity")?;
    let state: String = row.try_get("validation_state")?;
    let validated_at: Option<i64> = row.try_get("validated_at")?;

    let corrupt = |e: Error| Error::Internal(format!("Corrupt observation row: {}", e));

    Ok(Observation {
        id: row.try_get("id")?,
        observer_id: row.try_get("observer_id")?,
        observer_name: row.try_get("observer_name")?,
        location: Location::new(row.try_get("location_lat")?, row.try_get("location_lon")?),
        category: category.parse::<ObservationCategory>().map_err(corrupt)?,
        description: row.try_get("description")?,
        confidence: row.try_get("confidence")?,
        severity: severity.parse::<Severity>().map_err(corrupt)?,
        submitted_at: from_millis(row.try_get("submitted_at")?),
        validation_state: state.parse::<ValidationState>().map_err(corrupt)?,
        validator_id: row.try_get("validator_id")?,
        validated_at: validated_at.map(from_millis),
        reliability_score: row.try_get("reliability_score")?,
    })
}
