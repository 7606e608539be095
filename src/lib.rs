// SPDX-License-Identifier: MIT

//! Fly Events: coordinate travel with other event attendees.
//!
//! This crate provides the backend API for registering flight itineraries
//! against events and finding other attendees arriving in a similar
//! time window.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Db;
use services::{AuthStateStore, HcaClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub auth_states: AuthStateStore,
    pub hca: HcaClient,
}
