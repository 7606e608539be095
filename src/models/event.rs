//! Event model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An event people travel to (conference, hackathon, gathering).
/// Destination is stored uppercased.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub destination: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Event fields embedded in flight and match responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EventSummary {
    pub id: i64,
    pub name: String,
    pub destination: String,
}

/// Event plus the number of flights registered against it.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EventWithFlightCount {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub event: Event,
    pub flight_count: i64,
}
