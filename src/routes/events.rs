// SPDX-License-Identifier: MIT

//! Event catalog routes. Reads are public; writes are admin-only.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::sqlite::NewEvent;
use crate::error::{AppError, Result};
use crate::models::{Event, EventWithFlightCount};
use crate::time_utils::parse_arrival;
use crate::AppState;

pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/events", get(list_active_events))
        .route("/api/events/{id}", get(get_event))
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/events", post(create_event))
        .route("/api/events/{id}", put(update_event))
        .route("/api/events/{id}", delete(delete_event))
        .route("/api/events/admin/all", get(list_all_events))
}

/// Active events, soonest first (public listing).
async fn list_active_events(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EventWithFlightCount>>> {
    let events = state.db.list_active_events().await?;
    Ok(Json(events))
}

/// Single event by id.
async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
) -> Result<Json<EventWithFlightCount>> {
    let event = state
        .db
        .get_event_with_count(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;

    Ok(Json(event))
}

#[derive(Deserialize)]
pub struct CreateEventRequest {
    name: String,
    destination: String,
    #[serde(default)]
    description: Option<String>,
    start_date: String,
    #[serde(default)]
    end_date: Option<String>,
}

/// Create an event (admin).
async fn create_event(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("Event name is required".to_string()));
    }

    let destination = normalize_destination(&req.destination)?;
    let start_date = parse_arrival(&req.start_date)
        .ok_or_else(|| AppError::Validation("Invalid start_date".to_string()))?;
    let end_date = parse_optional_date(req.end_date.as_deref(), "end_date")?;

    let event = state
        .db
        .insert_event(&NewEvent {
            name,
            destination,
            description: req.description.filter(|d| !d.trim().is_empty()),
            start_date,
            end_date,
        })
        .await?;

    tracing::info!(event_id = event.id, "Event created");

    Ok((StatusCode::CREATED, Json(event)))
}

#[derive(Deserialize)]
pub struct UpdateEventRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    destination: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
}

/// Partially update an event (admin). Only supplied fields change; an
/// empty string clears description/end_date.
async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<Event>> {
    let mut event = state
        .db
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {} not found", event_id)))?;

    if let Some(name) = req.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Event name cannot be empty".to_string()));
        }
        event.name = name;
    }
    if let Some(destination) = req.destination {
        event.destination = normalize_destination(&destination)?;
    }
    if let Some(description) = req.description {
        let trimmed = description.trim();
        event.description = (!trimmed.is_empty()).then(|| trimmed.to_string());
    }
    if let Some(start_date) = req.start_date {
        event.start_date = parse_arrival(&start_date)
            .ok_or_else(|| AppError::Validation("Invalid start_date".to_string()))?;
    }
    if let Some(end_date) = req.end_date {
        event.end_date = parse_optional_date(Some(&end_date), "end_date")?;
    }
    if let Some(is_active) = req.is_active {
        event.is_active = is_active;
    }

    state.db.update_event(&event).await?;

    Ok(Json(event))
}

#[derive(Serialize)]
pub struct DeleteEventResponse {
    pub message: String,
}

/// Hard-delete an event (admin). Flights that referenced it keep their
/// row with the event link nulled.
async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
) -> Result<Json<DeleteEventResponse>> {
    if !state.db.delete_event(event_id).await? {
        return Err(AppError::NotFound(format!("Event {} not found", event_id)));
    }

    tracing::info!(event_id, "Event deleted");

    Ok(Json(DeleteEventResponse {
        message: "Event deleted successfully".to_string(),
    }))
}

/// All events including inactive ones, newest first (admin).
async fn list_all_events(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EventWithFlightCount>>> {
    let events = state.db.list_all_events().await?;
    Ok(Json(events))
}

/// Destinations are stored trimmed and uppercased ("SAN FRANCISCO").
fn normalize_destination(raw: &str) -> Result<String> {
    let destination = raw.trim().to_uppercase();
    if destination.is_empty() {
        return Err(AppError::Validation("Destination is required".to_string()));
    }
    Ok(destination)
}

fn parse_optional_date(
    raw: Option<&str>,
    field: &str,
) -> Result<Option<chrono::DateTime<chrono::Utc>>> {
    match raw {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => parse_arrival(value)
            .map(Some)
            .ok_or_else(|| AppError::Validation(format!("Invalid {}", field))),
    }
}
