//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; handlers only see the cached
//! `Config` inside `AppState`.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Hack Club Auth OAuth client ID (public)
    pub hca_client_id: String,
    /// Hack Club Auth OAuth client secret
    pub hca_client_secret: String,
    /// Redirect URI registered with the identity provider
    pub hca_redirect_uri: String,
    /// Frontend URL for post-login redirects
    pub frontend_url: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// SQLite database URL
    pub database_url: String,
    /// Slack bot token for match DMs (optional feature)
    pub slack_bot_token: Option<String>,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            hca_client_id: env::var("HACKCLUB_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("HACKCLUB_CLIENT_ID"))?,
            hca_client_secret: env::var("HACKCLUB_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("HACKCLUB_CLIENT_SECRET"))?,
            hca_redirect_uri: env::var("HACKCLUB_REDIRECT_URI")
                .unwrap_or_else(|_| "http://localhost:5001/api/auth/callback".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://fly_events.db".to_string()),
            slack_bot_token: env::var("SLACK_BOT_TOKEN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5001".to_string())
                .parse()
                .unwrap_or(5001),
        })
    }

    /// Default config for tests only.
    pub fn test_default() -> Self {
        Self {
            hca_client_id: "test_client_id".to_string(),
            hca_client_secret: "test_secret".to_string(),
            hca_redirect_uri: "http://localhost:5001/api/auth/callback".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
            database_url: "sqlite::memory:".to_string(),
            slack_bot_token: None,
            port: 5001,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("HACKCLUB_CLIENT_ID", "test_id");
        env::set_var("HACKCLUB_CLIENT_SECRET", "test_secret");
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!!");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.hca_client_id, "test_id");
        assert_eq!(config.hca_client_secret, "test_secret");
        assert_eq!(config.port, 5001);
    }
}
