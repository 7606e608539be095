// SPDX-License-Identifier: MIT

//! Flight registry integration tests: CRUD, normalization, ownership
//! scoping, and event linking rules.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use chrono::{TimeZone, Utc};
use serde_json::json;
use tower::ServiceExt;

mod common;

fn authed_json(
    method: Method,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_create_flight_normalizes_and_defaults() {
    let (app, state) = common::create_test_app().await;
    let user = common::seed_user(&state.db, "ident!a", "a@example.com", "A").await;
    let event = common::seed_event(
        &state.db,
        "Gathering",
        "NYC",
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
    )
    .await;
    let token = common::test_jwt(&state, &user);

    let response = app
        .oneshot(authed_json(
            Method::POST,
            "/api/flights",
            &token,
            json!({
                "flight_number": " ua1234 ",
                "event_id": event.id,
                "arrival_date": "2024-06-01T10:00"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = common::body_json(response).await;
    assert_eq!(body["flight_number"], "UA1234");
    assert_eq!(body["event_id"], event.id);
    assert_eq!(body["arrival_time"], "TBD");
    assert_eq!(body["is_active"], true);
    assert_eq!(body["user_id"], user.id);
}

#[tokio::test]
async fn test_create_flight_rejects_blank_number_and_bad_date() {
    let (app, state) = common::create_test_app().await;
    let user = common::seed_user(&state.db, "ident!a", "a@example.com", "A").await;
    let token = common::test_jwt(&state, &user);

    let response = app
        .clone()
        .oneshot(authed_json(
            Method::POST,
            "/api/flights",
            &token,
            json!({ "flight_number": "  ", "arrival_date": "2024-06-01T10:00" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(authed_json(
            Method::POST,
            "/api/flights",
            &token,
            json!({ "flight_number": "UA1", "arrival_date": "not-a-date" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_create_flight_rejects_inactive_or_missing_event() {
    let (app, state) = common::create_test_app().await;
    let user = common::seed_user(&state.db, "ident!a", "a@example.com", "A").await;
    let inactive = common::seed_inactive_event(
        &state.db,
        "Old",
        "NYC",
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    )
    .await;
    let token = common::test_jwt(&state, &user);

    for event_id in [inactive.id, 9999] {
        let response = app
            .clone()
            .oneshot(authed_json(
                Method::POST,
                "/api/flights",
                &token,
                json!({
                    "flight_number": "UA1",
                    "event_id": event_id,
                    "arrival_date": "2024-06-01T10:00"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "event {}", event_id);
    }
}

#[tokio::test]
async fn test_my_flights_are_ordered_with_event_summaries() {
    let (app, state) = common::create_test_app().await;
    let db = &state.db;
    let user = common::seed_user(db, "ident!a", "a@example.com", "A").await;
    let other = common::seed_user(db, "ident!b", "b@example.com", "B").await;
    let event = common::seed_event(
        db,
        "Gathering",
        "NYC",
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
    )
    .await;

    let later = common::seed_flight(
        db,
        user.id,
        Some(event.id),
        "UA2",
        Utc.with_ymd_and_hms(2024, 6, 2, 10, 0, 0).unwrap(),
    )
    .await;
    let earlier = common::seed_flight(
        db,
        user.id,
        None,
        "UA1",
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
    )
    .await;
    // Another user's flight must not leak into the listing
    common::seed_flight(
        db,
        other.id,
        Some(event.id),
        "DL9",
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
    )
    .await;

    let token = common::test_jwt(&state, &user);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/flights/my-flights")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    let flights = body.as_array().unwrap();
    assert_eq!(flights.len(), 2);
    assert_eq!(flights[0]["id"], earlier.id);
    assert!(flights[0]["event"].is_null());
    assert_eq!(flights[1]["id"], later.id);
    assert_eq!(flights[1]["event"]["name"], "Gathering");
}

#[tokio::test]
async fn test_update_flight_partial_patch_and_unlink() {
    let (app, state) = common::create_test_app().await;
    let db = &state.db;
    let user = common::seed_user(db, "ident!a", "a@example.com", "A").await;
    let event = common::seed_event(
        db,
        "Gathering",
        "NYC",
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
    )
    .await;
    let flight = common::seed_flight(
        db,
        user.id,
        Some(event.id),
        "UA1",
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
    )
    .await;
    let token = common::test_jwt(&state, &user);

    // Patch one field; the event link is untouched when absent.
    let response = app
        .clone()
        .oneshot(authed_json(
            Method::PUT,
            &format!("/api/flights/{}", flight.id),
            &token,
            json!({ "notes": "landing at T2" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["notes"], "landing at T2");
    assert_eq!(body["event_id"], event.id);
    assert_eq!(body["flight_number"], "UA1");

    // Explicit null unlinks the event.
    let response = app
        .oneshot(authed_json(
            Method::PUT,
            &format!("/api/flights/{}", flight.id),
            &token,
            json!({ "event_id": null }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert!(body["event_id"].is_null());
    assert_eq!(body["notes"], "landing at T2");
}

#[tokio::test]
async fn test_update_foreign_flight_reads_as_absent() {
    let (app, state) = common::create_test_app().await;
    let db = &state.db;
    let alice = common::seed_user(db, "ident!a", "a@example.com", "A").await;
    let bob = common::seed_user(db, "ident!b", "b@example.com", "B").await;
    let flight = common::seed_flight(
        db,
        alice.id,
        None,
        "UA1",
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
    )
    .await;

    let token = common::test_jwt(&state, &bob);
    let response = app
        .oneshot(authed_json(
            Method::PUT,
            &format!("/api/flights/{}", flight.id),
            &token,
            json!({ "notes": "mine now" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_flight_scoped_to_owner() {
    let (app, state) = common::create_test_app().await;
    let db = &state.db;
    let alice = common::seed_user(db, "ident!a", "a@example.com", "A").await;
    let bob = common::seed_user(db, "ident!b", "b@example.com", "B").await;
    let flight = common::seed_flight(
        db,
        alice.id,
        None,
        "UA1",
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
    )
    .await;

    // Bob cannot delete Alice's flight.
    let bob_token = common::test_jwt(&state, &bob);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/api/flights/{}", flight.id))
                .header(header::AUTHORIZATION, format!("Bearer {}", bob_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Alice can.
    let alice_token = common::test_jwt(&state, &alice);
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/api/flights/{}", flight.id))
                .header(header::AUTHORIZATION, format!("Bearer {}", alice_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(db.get_flight_owned(alice.id, flight.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_flight_routes_require_auth() {
    let (app, _state) = common::create_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/flights/my-flights")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_user_listing_is_gated() {
    let (app, state) = common::create_test_app().await;
    let db = &state.db;
    let user = common::seed_user(db, "ident!a", "a@example.com", "A").await;
    let admin = common::seed_admin(db, "ident!b", "b@example.com", "B").await;

    let user_token = common::test_jwt(&state, &user);
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/flights/admin/users")
                .header(header::AUTHORIZATION, format!("Bearer {}", user_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_token = common::test_jwt(&state, &admin);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/flights/admin/users")
                .header(header::AUTHORIZATION, format!("Bearer {}", admin_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}
