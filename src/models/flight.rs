//! Flight model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A flight itinerary owned by a user, optionally tied to an event.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Flight {
    pub id: i64,
    pub user_id: i64,
    pub event_id: Option<i64>,
    /// Trimmed and uppercased on write ("UA1234")
    pub flight_number: String,
    pub airline: Option<String>,
    pub origin: Option<String>,
    pub arrival_date: DateTime<Utc>,
    /// Free-form local arrival time shown to other travellers; "TBD"
    /// when the user hasn't filled it in
    pub arrival_time: String,
    pub notes: Option<String>,
    /// Inactive flights are hidden from match search
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Flight joined with its event summary for listings.
#[derive(Debug, Clone, Serialize)]
pub struct FlightWithEvent {
    #[serde(flatten)]
    pub flight: Flight,
    pub event: Option<super::EventSummary>,
}
