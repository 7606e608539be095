// SPDX-License-Identifier: MIT

//! Flight registry routes, scoped to the authenticated owner.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::sqlite::NewFlight;
use crate::db::Db;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Flight, FlightWithEvent, User};
use crate::time_utils::parse_arrival;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/flights/my-flights", get(list_my_flights))
        .route("/api/flights", post(create_flight))
        .route("/api/flights/{id}", put(update_flight))
        .route("/api/flights/{id}", delete(delete_flight))
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/flights/admin/users", get(list_users))
}

/// The caller's flights, earliest arrival first.
async fn list_my_flights(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<FlightWithEvent>>> {
    let flights = state.db.list_flights_for_user(user.user_id).await?;
    Ok(Json(flights))
}

#[derive(Deserialize)]
pub struct CreateFlightRequest {
    flight_number: String,
    #[serde(default)]
    event_id: Option<i64>,
    #[serde(default)]
    airline: Option<String>,
    #[serde(default)]
    origin: Option<String>,
    arrival_date: String,
    #[serde(default)]
    arrival_time: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
}

/// Register a flight for the caller.
async fn create_flight(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<CreateFlightRequest>,
) -> Result<(StatusCode, Json<Flight>)> {
    let flight_number = normalize_flight_number(&req.flight_number)?;

    let arrival_date = parse_arrival(&req.arrival_date)
        .ok_or_else(|| AppError::Validation("Invalid arrival_date".to_string()))?;

    if let Some(event_id) = req.event_id {
        ensure_active_event(&state.db, event_id).await?;
    }

    let arrival_time = req
        .arrival_time
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "TBD".to_string());

    let flight = state
        .db
        .insert_flight(&NewFlight {
            user_id: user.user_id,
            event_id: req.event_id,
            flight_number,
            airline: req.airline.filter(|a| !a.trim().is_empty()),
            origin: req.origin.filter(|o| !o.trim().is_empty()),
            arrival_date,
            arrival_time,
            notes: req.notes.filter(|n| !n.trim().is_empty()),
            is_active: req.is_active.unwrap_or(true),
        })
        .await?;

    tracing::info!(flight_id = flight.id, user_id = user.user_id, "Flight created");

    Ok((StatusCode::CREATED, Json(flight)))
}

#[derive(Deserialize)]
pub struct UpdateFlightRequest {
    #[serde(default)]
    flight_number: Option<String>,
    /// Missing = keep, null = unlink from event, value = relink
    #[serde(default, deserialize_with = "deserialize_some")]
    event_id: Option<Option<i64>>,
    #[serde(default)]
    airline: Option<String>,
    #[serde(default)]
    origin: Option<String>,
    #[serde(default)]
    arrival_date: Option<String>,
    #[serde(default)]
    arrival_time: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
}

/// Update the caller's flight. Only supplied fields change.
async fn update_flight(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(flight_id): Path<i64>,
    Json(req): Json<UpdateFlightRequest>,
) -> Result<Json<Flight>> {
    // Ownership check first: another user's flight id reads as absent.
    let mut flight = state
        .db
        .get_flight_owned(user.user_id, flight_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Flight not found".to_string()))?;

    if let Some(flight_number) = req.flight_number {
        flight.flight_number = normalize_flight_number(&flight_number)?;
    }
    if let Some(event_id) = req.event_id {
        if let Some(event_id) = event_id {
            ensure_active_event(&state.db, event_id).await?;
        }
        flight.event_id = event_id;
    }
    if let Some(airline) = req.airline {
        let trimmed = airline.trim();
        flight.airline = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }
    if let Some(origin) = req.origin {
        let trimmed = origin.trim();
        flight.origin = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }
    if let Some(arrival_date) = req.arrival_date {
        flight.arrival_date = parse_arrival(&arrival_date)
            .ok_or_else(|| AppError::Validation("Invalid arrival_date".to_string()))?;
    }
    if let Some(arrival_time) = req.arrival_time {
        let trimmed = arrival_time.trim();
        flight.arrival_time = if trimmed.is_empty() {
            "TBD".to_string()
        } else {
            trimmed.to_string()
        };
    }
    if let Some(notes) = req.notes {
        let trimmed = notes.trim();
        flight.notes = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }
    if let Some(is_active) = req.is_active {
        flight.is_active = is_active;
    }

    state.db.update_flight(&flight).await?;

    Ok(Json(flight))
}

#[derive(Serialize)]
pub struct DeleteFlightResponse {
    pub message: String,
}

/// Delete the caller's flight.
async fn delete_flight(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(flight_id): Path<i64>,
) -> Result<Json<DeleteFlightResponse>> {
    if !state.db.delete_flight(user.user_id, flight_id).await? {
        return Err(AppError::NotFound("Flight not found".to_string()));
    }

    tracing::info!(flight_id, user_id = user.user_id, "Flight deleted");

    Ok(Json(DeleteFlightResponse {
        message: "Flight deleted successfully".to_string(),
    }))
}

/// All users, newest first (admin view).
async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>> {
    let users = state.db.list_users().await?;
    Ok(Json(users))
}

/// Distinguish a missing field from an explicit null: missing stays
/// `None`, while both `null` and a value become `Some(..)`.
fn deserialize_some<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Flight numbers are stored trimmed and uppercased ("ua 1234" -> "UA 1234").
fn normalize_flight_number(raw: &str) -> Result<String> {
    let flight_number = raw.trim().to_uppercase();
    if flight_number.is_empty() {
        return Err(AppError::Validation("Flight number is required".to_string()));
    }
    Ok(flight_number)
}

/// A flight may only reference an event that exists and is active.
async fn ensure_active_event(db: &Db, event_id: i64) -> Result<()> {
    match db.get_event(event_id).await? {
        Some(event) if event.is_active => Ok(()),
        Some(_) => Err(AppError::Validation(format!(
            "Event {} is not active",
            event_id
        ))),
        None => Err(AppError::Validation(format!(
            "Event {} does not exist",
            event_id
        ))),
    }
}
