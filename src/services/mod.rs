// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod auth_state;
pub mod directory;
pub mod hca;
pub mod matches;
pub mod slack;

pub use auth_state::AuthStateStore;
pub use hca::{HcaClient, IdentityClaims};
pub use matches::Match;
pub use slack::SlackClient;
