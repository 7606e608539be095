// SPDX-License-Identifier: MIT

//! Fly Events API Server
//!
//! Lets event attendees register flight itineraries and find other
//! attendees arriving in a similar time window, authenticating through
//! Hack Club Auth.

use fly_events::{
    config::Config,
    db::Db,
    services::{AuthStateStore, HcaClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Fly Events API");

    // Open the database (creates the schema on first run)
    let db = Db::connect(&config.database_url)
        .await
        .expect("Failed to open database");

    // Identity provider client
    let hca = HcaClient::new(
        config.hca_client_id.clone(),
        config.hca_client_secret.clone(),
        config.hca_redirect_uri.clone(),
    );

    // OAuth state nonce store + periodic expiry sweep
    let auth_states = AuthStateStore::new();
    auth_states.spawn_sweeper();

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        auth_states,
        hca,
    });

    // Build router
    let app = fly_events::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fly_events=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
