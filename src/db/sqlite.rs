// SPDX-License-Identifier: MIT

//! SQLite client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (accounts keyed by identity-provider subject id)
//! - Events (admin-managed destinations)
//! - Flights (per-user itineraries + match window queries)

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::AppError;
use crate::models::{
    Event, EventSummary, EventWithFlightCount, Flight, FlightWithEvent, Role, User, UserContact,
};

/// New user record for insertion. Role is always `user`. external_id is
/// `None` only for accounts created before the identity provider link.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub external_id: Option<String>,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub slack_id: Option<String>,
}

/// New event record for insertion. Destination must already be uppercased.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub destination: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

/// New flight record for insertion. Flight number must already be
/// trimmed and uppercased, and event_id validated as active.
#[derive(Debug, Clone)]
pub struct NewFlight {
    pub user_id: i64,
    pub event_id: Option<i64>,
    pub flight_number: String,
    pub airline: Option<String>,
    pub origin: Option<String>,
    pub arrival_date: DateTime<Utc>,
    pub arrival_time: String,
    pub notes: Option<String>,
    pub is_active: bool,
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        external_id TEXT UNIQUE,
        email TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        phone TEXT,
        slack_id TEXT,
        role TEXT NOT NULL DEFAULT 'user',
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        destination TEXT NOT NULL,
        description TEXT,
        start_date TEXT NOT NULL,
        end_date TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS flights (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        event_id INTEGER REFERENCES events(id) ON DELETE SET NULL,
        flight_number TEXT NOT NULL,
        airline TEXT,
        origin TEXT,
        arrival_date TEXT NOT NULL,
        arrival_time TEXT NOT NULL DEFAULT 'TBD',
        notes TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_flights_event_arrival
        ON flights(event_id, arrival_date, is_active)",
    "CREATE INDEX IF NOT EXISTS idx_flights_user ON flights(user_id)",
];

/// SQLite database client.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Connect to the database and ensure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::Database(format!("Invalid DATABASE_URL: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;

        let db = Self { pool };
        db.init_schema().await?;

        tracing::info!(url = database_url, "Connected to SQLite");
        Ok(db)
    }

    /// In-memory database for tests. A single connection keeps every
    /// query on the same `:memory:` instance.
    pub async fn connect_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::Database(e.to_string()))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    async fn init_schema(&self) -> Result<(), AppError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by internal id.
    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Get a user by identity-provider subject id.
    pub async fn get_user_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE external_id = ?")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Get a user by email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Insert a new user with role `user`.
    ///
    /// The unique constraint on external_id is the backstop against
    /// concurrent first-login upserts; a violation surfaces as
    /// `AppError::Conflict`.
    pub async fn insert_user(&self, new: &NewUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (external_id, email, name, phone, slack_id, role, created_at)
             VALUES (?, ?, ?, ?, ?, 'user', ?)
             RETURNING *",
        )
        .bind(&new.external_id)
        .bind(&new.email)
        .bind(&new.name)
        .bind(&new.phone)
        .bind(&new.slack_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    /// Refresh mutable profile fields from the latest identity claims.
    /// external_id and role are never touched here.
    pub async fn update_user_profile(
        &self,
        user_id: i64,
        name: &str,
        email: &str,
        phone: Option<&str>,
        slack_id: Option<&str>,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET name = ?, email = ?, phone = ?, slack_id = ?
             WHERE id = ?
             RETURNING *",
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(slack_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    /// Attach an identity-provider subject id to a pre-existing account
    /// (email-based migration path).
    pub async fn attach_external_id(
        &self,
        user_id: i64,
        external_id: &str,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET external_id = ? WHERE id = ? AND external_id IS NULL
             RETURNING *",
        )
        .bind(external_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    /// All users, newest first (admin listing).
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    /// Set a user's role (promotion script / tests).
    pub async fn set_user_role(&self, user_id: i64, role: Role) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ─── Event Operations ────────────────────────────────────────

    /// Get a single event.
    pub async fn get_event(&self, event_id: i64) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    /// Get a single event with its flight count.
    pub async fn get_event_with_count(
        &self,
        event_id: i64,
    ) -> Result<Option<EventWithFlightCount>, AppError> {
        let event = sqlx::query_as::<_, EventWithFlightCount>(
            "SELECT e.*,
                    (SELECT COUNT(*) FROM flights f WHERE f.event_id = e.id) AS flight_count
             FROM events e WHERE e.id = ?",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    /// Active events ordered by start date ascending (public listing).
    pub async fn list_active_events(&self) -> Result<Vec<EventWithFlightCount>, AppError> {
        let events = sqlx::query_as::<_, EventWithFlightCount>(
            "SELECT e.*,
                    (SELECT COUNT(*) FROM flights f WHERE f.event_id = e.id) AS flight_count
             FROM events e WHERE e.is_active = 1
             ORDER BY e.start_date ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    /// All events including inactive, newest first (admin listing).
    pub async fn list_all_events(&self) -> Result<Vec<EventWithFlightCount>, AppError> {
        let events = sqlx::query_as::<_, EventWithFlightCount>(
            "SELECT e.*,
                    (SELECT COUNT(*) FROM flights f WHERE f.event_id = e.id) AS flight_count
             FROM events e
             ORDER BY e.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    /// Insert a new event (active by default).
    pub async fn insert_event(&self, new: &NewEvent) -> Result<Event, AppError> {
        let event = sqlx::query_as::<_, Event>(
            "INSERT INTO events (name, destination, description, start_date, end_date, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, 1, ?)
             RETURNING *",
        )
        .bind(&new.name)
        .bind(&new.destination)
        .bind(&new.description)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(event)
    }

    /// Write back a full event row (fetch-modify-write update).
    pub async fn update_event(&self, event: &Event) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE events SET name = ?, destination = ?, description = ?,
                    start_date = ?, end_date = ?, is_active = ?
             WHERE id = ?",
        )
        .bind(&event.name)
        .bind(&event.destination)
        .bind(&event.description)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(event.is_active)
        .bind(event.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Hard-delete an event. Referencing flights keep their row but lose
    /// the event link (ON DELETE SET NULL). Returns false if absent.
    pub async fn delete_event(&self, event_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ─── Flight Operations ───────────────────────────────────────

    /// All flights owned by a user, earliest arrival first, with event
    /// summaries attached.
    pub async fn list_flights_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<FlightWithEvent>, AppError> {
        let rows = sqlx::query_as::<_, FlightEventRow>(
            "SELECT f.*,
                    e.id AS e_id, e.name AS e_name, e.destination AS e_destination
             FROM flights f
             LEFT JOIN events e ON e.id = f.event_id
             WHERE f.user_id = ?
             ORDER BY f.arrival_date ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FlightEventRow::into_joined).collect())
    }

    /// A flight by id, only if owned by the given user.
    pub async fn get_flight_owned(
        &self,
        user_id: i64,
        flight_id: i64,
    ) -> Result<Option<Flight>, AppError> {
        let flight =
            sqlx::query_as::<_, Flight>("SELECT * FROM flights WHERE id = ? AND user_id = ?")
                .bind(flight_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(flight)
    }

    /// Insert a new flight.
    pub async fn insert_flight(&self, new: &NewFlight) -> Result<Flight, AppError> {
        let flight = sqlx::query_as::<_, Flight>(
            "INSERT INTO flights (user_id, event_id, flight_number, airline, origin,
                                  arrival_date, arrival_time, notes, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
        .bind(new.user_id)
        .bind(new.event_id)
        .bind(&new.flight_number)
        .bind(&new.airline)
        .bind(&new.origin)
        .bind(new.arrival_date)
        .bind(&new.arrival_time)
        .bind(&new.notes)
        .bind(new.is_active)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(flight)
    }

    /// Write back a full flight row (fetch-modify-write update).
    pub async fn update_flight(&self, flight: &Flight) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE flights SET event_id = ?, flight_number = ?, airline = ?, origin = ?,
                    arrival_date = ?, arrival_time = ?, notes = ?, is_active = ?
             WHERE id = ?",
        )
        .bind(flight.event_id)
        .bind(&flight.flight_number)
        .bind(&flight.airline)
        .bind(&flight.origin)
        .bind(flight.arrival_date)
        .bind(&flight.arrival_time)
        .bind(&flight.notes)
        .bind(flight.is_active)
        .bind(flight.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete a flight, scoped to its owner. Returns false if no flight
    /// with that id belongs to the user.
    pub async fn delete_flight(&self, user_id: i64, flight_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM flights WHERE id = ? AND user_id = ?")
            .bind(flight_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Active flights for an event arriving inside `[window_start,
    /// window_end]` (inclusive), excluding the requester's own flights,
    /// earliest arrival first. Joined with owner contact info and the
    /// event summary.
    pub async fn find_flights_in_window(
        &self,
        event_id: i64,
        exclude_user_id: i64,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<(Flight, UserContact, EventSummary)>, AppError> {
        let rows = sqlx::query_as::<_, MatchRow>(
            "SELECT f.*,
                    u.id AS u_id, u.name AS u_name, u.email AS u_email,
                    u.phone AS u_phone, u.slack_id AS u_slack_id,
                    e.id AS e_id, e.name AS e_name, e.destination AS e_destination
             FROM flights f
             JOIN users u ON u.id = f.user_id
             JOIN events e ON e.id = f.event_id
             WHERE f.event_id = ?
               AND f.is_active = 1
               AND f.user_id != ?
               AND f.arrival_date >= ?
               AND f.arrival_date <= ?
             ORDER BY f.arrival_date ASC",
        )
        .bind(event_id)
        .bind(exclude_user_id)
        .bind(window_start)
        .bind(window_end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MatchRow::into_parts).collect())
    }
}

/// Row shape for flight listings with a LEFT JOINed event.
#[derive(sqlx::FromRow)]
struct FlightEventRow {
    #[sqlx(flatten)]
    flight: Flight,
    e_id: Option<i64>,
    e_name: Option<String>,
    e_destination: Option<String>,
}

impl FlightEventRow {
    fn into_joined(self) -> FlightWithEvent {
        let event = match (self.e_id, self.e_name, self.e_destination) {
            (Some(id), Some(name), Some(destination)) => Some(EventSummary {
                id,
                name,
                destination,
            }),
            _ => None,
        };
        FlightWithEvent {
            flight: self.flight,
            event,
        }
    }
}

/// Row shape for match queries (flight + owner contact + event).
#[derive(sqlx::FromRow)]
struct MatchRow {
    #[sqlx(flatten)]
    flight: Flight,
    u_id: i64,
    u_name: String,
    u_email: String,
    u_phone: Option<String>,
    u_slack_id: Option<String>,
    e_id: i64,
    e_name: String,
    e_destination: String,
}

impl MatchRow {
    fn into_parts(self) -> (Flight, UserContact, EventSummary) {
        (
            self.flight,
            UserContact {
                id: self.u_id,
                name: self.u_name,
                email: self.u_email,
                phone: self.u_phone,
                slack_id: self.u_slack_id,
            },
            EventSummary {
                id: self.e_id,
                name: self.e_name,
                destination: self.e_destination,
            },
        )
    }
}
