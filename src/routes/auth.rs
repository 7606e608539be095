// SPDX-License-Identifier: MIT

//! OAuth login routes (Hack Club Auth).
//!
//! Login issues a single-use state nonce and hands the browser the
//! provider's authorization URL; the callback verifies the nonce,
//! exchanges the code, resolves the user, and redirects back to the
//! frontend with a session JWT. Callback failures always redirect with
//! a machine-readable error code - the user never sees a raw error.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, AuthUser};
use crate::models::User;
use crate::services::directory;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/login", get(login_start))
        .route("/api/auth/callback", get(login_callback))
        .route("/api/auth/logout", post(logout))
}

/// Routes that require an authenticated session.
pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/auth/me", get(get_me))
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub auth_url: String,
    pub state: String,
}

/// Start the OAuth flow: issue a state nonce and build the provider
/// authorization URL. The frontend performs the actual redirect.
async fn login_start(State(state): State<Arc<AppState>>) -> Result<Json<LoginResponse>> {
    let nonce = state.auth_states.issue()?;
    let auth_url = state.hca.authorization_url(&nonce);

    tracing::info!("Starting OAuth flow");

    Ok(Json(LoginResponse {
        auth_url,
        state: nonce,
    }))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback: verify state, exchange code, upsert user, mint JWT.
///
/// Every failure path redirects to the frontend login view with an error
/// code in the query string.
async fn login_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    let frontend = &state.config.frontend_url;

    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from provider");
        return login_error(frontend, &error);
    }

    let (code, nonce) = match (params.code, params.state) {
        (Some(code), Some(nonce)) if !code.is_empty() && !nonce.is_empty() => (code, nonce),
        _ => {
            tracing::warn!("OAuth callback missing code or state");
            return login_error(frontend, "missing_code_or_state");
        }
    };

    // Single-use: a replayed or expired state fails here.
    if !state.auth_states.consume(&nonce) {
        tracing::warn!("OAuth callback with invalid or consumed state");
        return login_error(frontend, "invalid_state");
    }

    match complete_login(&state, &code).await {
        Ok(token) => {
            let redirect_url = format!("{}/auth/success?token={}", frontend, token);
            Redirect::temporary(&redirect_url)
        }
        Err(err) => {
            tracing::error!(error = %err, "OAuth callback failed");
            let code = match err {
                AppError::UpstreamAuth(_) => "upstream_auth_error",
                AppError::Conflict(_) => "account_conflict",
                _ => "server_error",
            };
            login_error(frontend, code)
        }
    }
}

/// Exchange the code, resolve the account, and mint a session token.
async fn complete_login(state: &Arc<AppState>, code: &str) -> Result<String> {
    let access_token = state.hca.exchange_code(code).await?;
    let claims = state.hca.fetch_identity(&access_token).await?;

    let user = directory::upsert_from_identity(&state.db, &claims).await?;

    tracing::info!(user_id = user.id, "OAuth login successful");

    let external_id = user.external_id.as_deref().unwrap_or_default();
    let jwt = create_jwt(user.id, external_id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    Ok(jwt)
}

fn login_error(frontend_url: &str, code: &str) -> Redirect {
    let url = format!(
        "{}/login?error={}",
        frontend_url,
        urlencoding::encode(code)
    );
    Redirect::temporary(&url)
}

/// Get the current user's profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<User>> {
    let profile = state
        .db
        .get_user(user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.user_id)))?;

    Ok(Json(profile))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// Logout - the client discards its token; this exists for symmetry.
async fn logout() -> Json<LogoutResponse> {
    Json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    })
}
