//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Application role. New registrants are always `User`; admins are
/// promoted out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// User account created on first successful login.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    /// Identity provider subject id ("ident!xxx" format). Immutable once
    /// set; None only for pre-provider accounts awaiting migration.
    pub external_id: Option<String>,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    /// Slack member ID, used for match DMs
    pub slack_id: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Contact fields exposed to matched travellers.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserContact {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub slack_id: Option<String>,
}
