//! Validation decisions and their audit log

use coastal_common::time::{from_millis, now, to_millis};
use coastal_common::{Error, Result};
use sqlx::Row;
use tracing::info;

use super::ObservationStore;
use crate::models::{ValidationRecord, ValidationResult, ValidationState};

impl ObservationStore {
    /// Record a validator's decision on an observation
    ///
    /// Updates the observation's validation fields and appends a history
    /// entry in one transaction. Concurrent decisions on the same
    /// observation are serialized by SQLite; the last writer wins.
    ///
    /// # Errors
    /// `Error::NotFound` if the observation does not exist.
    pub async fn record_validation(
        &self,
        observation_id: i64,
        validator_id: &str,
        is_valid: bool,
        reliability_adjustment: f64,
        notes: &str,
    ) -> Result<ValidationRecord> {
        let validated_at = now();
        let state = ValidationState::from_decision(is_valid);
        let result = if is_valid {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid
        };

        let mut tx = self.pool().begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE observations
            SET validation_state = ?, validator_id = ?, validated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(state.as_str())
        .bind(validator_id)
        .bind(to_millis(validated_at))
        .bind(observation_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            // Dropping the transaction rolls it back
            return Err(Error::NotFound(format!("observation {}", observation_id)));
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO validation_history (
                observation_id, validator_id, validation_result,
                reliability_adjustment, notes, validated_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(observation_id)
        .bind(validator_id)
        .bind(result.as_str())
        .bind(reliability_adjustment)
        .bind(notes)
        .bind(to_millis(validated_at))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Observation {} marked {} by {}",
            observation_id, state, validator_id
        );

        Ok(ValidationRecord {
            validation_id: inserted.last_insert_rowid(),
            observation_id,
            validator_id: validator_id.to_string(),
            result,
            reliability_adjustment,
            notes: notes.to_string(),
            validated_at: from_millis(to_millis(validated_at)),
        })
    }

    /// Validation decisions for an observation, oldest first
    pub async fn validation_history(&self, observation_id: i64) -> Result<Vec<ValidationRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT validation_id, observation_id, validator_id, validation_result,
                   reliability_adjustment, notes, validated_at
            FROM validation_history
            WHERE observation_id = ?
            ORDER BY validation_id ASC
            "#,
        )
        .bind(observation_id)
        .fetch_all(self.pool())
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let result: String = row.try_get("validation_result")?;
            records.push(ValidationRecord {
                validation_id: row.try_get("validation_id")?,
                observation_id: row.try_get("observation_id")?,
                validator_id: row.try_get("validator_id")?,
                result: result
                    .parse::<ValidationResult>()
                    .map_err(|e| Error::Internal(format!("Corrupt validation row: {}", e)))?,
                reliability_adjustment: row.try_get("reliability_adjustment")?,
                notes: row.try_get("notes")?,
                validated_at: from_millis(row.try_get("validated_at")?),
            });
        }

        Ok(records)
    }
}
