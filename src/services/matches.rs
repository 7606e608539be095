// SPDX-License-Identifier: MIT

//! Match finder: other users' flights arriving near a reference time.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::db::Db;
use crate::error::{AppError, Result};
use crate::models::{EventSummary, Flight, UserContact};

/// Default tolerance window in hours.
pub const DEFAULT_WINDOW_HOURS: f64 = 4.0;

/// Another user's flight within the tolerance window.
#[derive(Debug, Clone, Serialize)]
pub struct Match {
    #[serde(flatten)]
    pub flight: Flight,
    pub user: UserContact,
    pub event: EventSummary,
    /// |arrival - target| in hours, rounded to one decimal
    pub time_difference_hours: f64,
}

/// Find active flights for `event_id` arriving within `window_hours` of
/// `target_arrival` (inclusive, symmetric), excluding the requester's own
/// flights. Ordered by arrival ascending; unbounded result set.
pub async fn find_by_event(
    db: &Db,
    requester_user_id: i64,
    event_id: i64,
    target_arrival: DateTime<Utc>,
    window_hours: f64,
) -> Result<Vec<Match>> {
    if !window_hours.is_finite() || window_hours < 0.0 {
        return Err(AppError::Validation(
            "time_window must be a non-negative number of hours".to_string(),
        ));
    }

    let half_window = Duration::seconds((window_hours * 3600.0).round() as i64);
    let window_start = target_arrival - half_window;
    let window_end = target_arrival + half_window;

    let rows = db
        .find_flights_in_window(event_id, requester_user_id, window_start, window_end)
        .await?;

    let matches = rows
        .into_iter()
        .map(|(flight, user, event)| {
            let time_difference_hours = hours_between(flight.arrival_date, target_arrival);
            Match {
                flight,
                user,
                event,
                time_difference_hours,
            }
        })
        .collect();

    Ok(matches)
}

/// Absolute difference in hours, rounded to one decimal place.
/// Symmetric: swapping the arguments yields the same value.
pub fn hours_between(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    let diff_seconds = (a - b).num_seconds().abs() as f64;
    (diff_seconds / 3600.0 * 10.0).round() / 10.0
}
