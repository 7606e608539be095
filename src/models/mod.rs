// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod event;
pub mod flight;
pub mod user;

pub use event::{Event, EventSummary, EventWithFlightCount};
pub use flight::{Flight, FlightWithEvent};
pub use user::{Role, User, UserContact};
