// SPDX-License-Identifier: MIT

//! Shared test harness: in-memory app factory and seed helpers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use fly_events::config::Config;
use fly_events::db::sqlite::{NewEvent, NewFlight, NewUser};
use fly_events::db::Db;
use fly_events::middleware::auth::create_jwt;
use fly_events::models::{Event, Flight, Role, User};
use fly_events::routes::create_router;
use fly_events::services::{AuthStateStore, HcaClient};
use fly_events::AppState;

/// Create a test app backed by an in-memory database.
/// The identity provider URL points at a closed local port so any
/// unexpected upstream call fails fast.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = Db::connect_memory().await.expect("in-memory db");

    let hca = HcaClient::new(
        config.hca_client_id.clone(),
        config.hca_client_secret.clone(),
        config.hca_redirect_uri.clone(),
    )
    .with_base_url("http://127.0.0.1:1");

    let state = Arc::new(AppState {
        config,
        db,
        auth_states: AuthStateStore::new(),
        hca,
    });

    (create_router(state.clone()), state)
}

/// Mint a session token the way the login flow does.
#[allow(dead_code)]
pub fn test_jwt(state: &AppState, user: &User) -> String {
    create_jwt(
        user.id,
        user.external_id.as_deref().unwrap_or_default(),
        &state.config.jwt_signing_key,
    )
    .expect("jwt")
}

/// Insert a user with role `user`.
#[allow(dead_code)]
pub async fn seed_user(db: &Db, external_id: &str, email: &str, name: &str) -> User {
    db.insert_user(&NewUser {
        external_id: Some(external_id.to_string()),
        email: email.to_string(),
        name: name.to_string(),
        phone: None,
        slack_id: None,
    })
    .await
    .expect("seed user")
}

/// Insert a user and promote them to admin.
#[allow(dead_code)]
pub async fn seed_admin(db: &Db, external_id: &str, email: &str, name: &str) -> User {
    let user = seed_user(db, external_id, email, name).await;
    db.set_user_role(user.id, Role::Admin)
        .await
        .expect("promote admin");
    db.get_user(user.id).await.expect("reload").expect("admin")
}

/// Insert an active event.
#[allow(dead_code)]
pub async fn seed_event(db: &Db, name: &str, destination: &str, start: DateTime<Utc>) -> Event {
    db.insert_event(&NewEvent {
        name: name.to_string(),
        destination: destination.to_string(),
        description: None,
        start_date: start,
        end_date: None,
    })
    .await
    .expect("seed event")
}

/// Insert an event and immediately deactivate it.
#[allow(dead_code)]
pub async fn seed_inactive_event(
    db: &Db,
    name: &str,
    destination: &str,
    start: DateTime<Utc>,
) -> Event {
    let mut event = seed_event(db, name, destination, start).await;
    event.is_active = false;
    db.update_event(&event).await.expect("deactivate event");
    event
}

/// Insert an active flight.
#[allow(dead_code)]
pub async fn seed_flight(
    db: &Db,
    user_id: i64,
    event_id: Option<i64>,
    flight_number: &str,
    arrival: DateTime<Utc>,
) -> Flight {
    db.insert_flight(&NewFlight {
        user_id,
        event_id,
        flight_number: flight_number.to_string(),
        airline: None,
        origin: None,
        arrival_date: arrival,
        arrival_time: "TBD".to_string(),
        notes: None,
        is_active: true,
    })
    .await
    .expect("seed flight")
}

/// Read a JSON response body.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}
