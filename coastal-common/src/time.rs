//! Timestamp utilities
//!
//! Timestamps are persisted as Unix epoch milliseconds (INTEGER columns) so
//! that time-window filters are plain numeric comparisons.

use chrono::{DateTime, Duration, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert a timestamp to its stored representation
pub fn to_millis(timestamp: DateTime<Utc>) -> i64 {
    timestamp.timestamp_millis()
}

/// Convert a stored value back to a timestamp
///
/// Out-of-range values fall back to the Unix epoch.
pub fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Lower bound of a lookback window ending at `now`
///
/// Saturates at the earliest representable time when the window reaches
/// past it.
pub fn hours_before(now: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
    window_start(now, Duration::try_hours(hours), hours)
}

/// Lower bound of a lookback window ending at `now`
///
/// Saturates like [`hours_before`].
pub fn days_before(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    window_start(now, Duration::try_days(days), days)
}

fn window_start(now: DateTime<Utc>, span: Option<Duration>, amount: i64) -> DateTime<Utc> {
    span.and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(if amount >= 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}
