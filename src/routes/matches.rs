// SPDX-License-Identifier: MIT

//! Match search routes: find attendees arriving in a similar window.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::FlightWithEvent;
use crate::services::matches::{self, Match, DEFAULT_WINDOW_HOURS};
use crate::services::SlackClient;
use crate::time_utils::parse_arrival;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/matches/find", get(find_matches))
        .route("/api/matches/flight/{id}", get(matches_for_flight))
        .route("/api/matches/dm/{user_id}", post(send_match_dm))
}

#[derive(Deserialize)]
pub struct FindMatchesQuery {
    #[serde(default)]
    event_id: Option<i64>,
    #[serde(default)]
    arrival_date: Option<String>,
    #[serde(default)]
    time_window: Option<f64>,
}

/// Find flights arriving within the tolerance window of a target time
/// for an event, excluding the caller's own flights.
async fn find_matches(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<FindMatchesQuery>,
) -> Result<Json<Vec<Match>>> {
    let event_id = params.event_id.ok_or_else(|| {
        AppError::Validation("event_id and arrival_date are required".to_string())
    })?;
    let arrival_raw = params.arrival_date.ok_or_else(|| {
        AppError::Validation("event_id and arrival_date are required".to_string())
    })?;

    let target_arrival = parse_arrival(&arrival_raw)
        .ok_or_else(|| AppError::Validation("Invalid arrival_date".to_string()))?;
    let window_hours = params.time_window.unwrap_or(DEFAULT_WINDOW_HOURS);

    tracing::debug!(
        user_id = user.user_id,
        event_id,
        window_hours,
        "Match search by criteria"
    );

    let results =
        matches::find_by_event(&state.db, user.user_id, event_id, target_arrival, window_hours)
            .await?;

    Ok(Json(results))
}

#[derive(Serialize)]
pub struct FlightMatchesResponse {
    pub flight: FlightWithEvent,
    pub matches: Vec<Match>,
}

/// Matches for one of the caller's own flights, using the default
/// 4-hour window around its arrival.
async fn matches_for_flight(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(flight_id): Path<i64>,
) -> Result<Json<FlightMatchesResponse>> {
    let flight = state
        .db
        .get_flight_owned(user.user_id, flight_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Flight not found".to_string()))?;

    let event = match flight.event_id {
        Some(event_id) => state.db.get_event(event_id).await?.map(|e| {
            crate::models::EventSummary {
                id: e.id,
                name: e.name,
                destination: e.destination,
            }
        }),
        None => None,
    };

    // A flight without an event has nobody to match against.
    let matches = match flight.event_id {
        Some(event_id) => {
            matches::find_by_event(
                &state.db,
                user.user_id,
                event_id,
                flight.arrival_date,
                DEFAULT_WINDOW_HOURS,
            )
            .await?
        }
        None => Vec::new(),
    };

    Ok(Json(FlightMatchesResponse {
        flight: FlightWithEvent { flight, event },
        matches,
    }))
}

#[derive(Serialize)]
pub struct DmResponse {
    pub message: String,
}

/// Send a Slack DM to a matched user so travellers can coordinate.
async fn send_match_dm(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(target_user_id): Path<i64>,
) -> Result<Json<DmResponse>> {
    let bot_token = state
        .config
        .slack_bot_token
        .clone()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Slack bot not configured")))?;

    let target = state
        .db
        .get_user(target_user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", target_user_id)))?;

    let slack_id = target.slack_id.as_deref().ok_or_else(|| {
        AppError::Validation("User does not have a Slack ID connected".to_string())
    })?;

    let sender = state
        .db
        .get_user(user.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let text = format!(
        "Hey {}! {} just found you on Fly Events and wants to coordinate travel. \
         You have flights arriving around the same time.",
        target.name, sender.name
    );

    SlackClient::new(bot_token).send_dm(slack_id, &text).await?;

    tracing::info!(
        from = user.user_id,
        to = target_user_id,
        "Match DM sent on Slack"
    );

    Ok(Json(DmResponse {
        message: "DM sent on Slack".to_string(),
    }))
}
