// SPDX-License-Identifier: MIT

//! Hack Club Auth client (external identity provider).
//!
//! Handles:
//! - Authorization URL construction
//! - Authorization-code-for-token exchange
//! - Userinfo fetch with claim normalization

use serde::Deserialize;

use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://auth.hackclub.com";
const OAUTH_SCOPES: &str = "openid profile email";

/// Normalized identity claims extracted from the provider's userinfo
/// response.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityClaims {
    /// Provider subject id ("ident!xxx" format)
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub slack_id: Option<String>,
}

/// Hack Club Auth API client.
#[derive(Clone)]
pub struct HcaClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl HcaClient {
    /// Create a new client with OAuth credentials. Credential presence is
    /// enforced when `Config` loads, so construction is infallible.
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id,
            client_secret,
            redirect_uri,
        }
    }

    /// Point the client at a different provider URL (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the authorization URL the browser is sent to, binding the
    /// login attempt to `state`.
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}/oauth/authorize?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            self.base_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(OAUTH_SCOPES),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<String, AppError> {
        let response = self
            .http
            .post(format!("{}/oauth/token", self.base_url))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::UpstreamAuth(format!("Token request failed: {}", e)))?;

        let token: TokenResponse = Self::check_response_json(response).await?;

        match token.access_token {
            Some(access_token) if !access_token.is_empty() => Ok(access_token),
            _ => Err(AppError::UpstreamAuth(
                "No access token in provider response".to_string(),
            )),
        }
    }

    /// Fetch and normalize the authenticated user's identity claims.
    pub async fn fetch_identity(&self, access_token: &str) -> Result<IdentityClaims, AppError> {
        let response = self
            .http
            .get(format!("{}/api/v1/me", self.base_url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::UpstreamAuth(format!("Userinfo request failed: {}", e)))?;

        let userinfo: UserinfoResponse = Self::check_response_json(response).await?;
        normalize_claims(userinfo)
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamAuth(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::UpstreamAuth(format!("Invalid provider response: {}", e)))
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Raw userinfo payload. Claims are nested under `identity`, with name
/// spread across several provider-specific fields.
#[derive(Debug, Default, Deserialize)]
struct UserinfoResponse {
    #[serde(default)]
    identity: Option<RawIdentity>,
}

#[derive(Debug, Default, Deserialize)]
struct RawIdentity {
    id: Option<String>,
    primary_email: Option<String>,
    name: Option<String>,
    full_name: Option<String>,
    display_name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    phone_number: Option<String>,
    slack_id: Option<String>,
}

/// Normalize raw provider claims, requiring a subject id and email.
fn normalize_claims(userinfo: UserinfoResponse) -> Result<IdentityClaims, AppError> {
    let identity = userinfo
        .identity
        .ok_or_else(|| AppError::UpstreamAuth("No identity in provider response".to_string()))?;

    let email = match identity.primary_email.as_deref() {
        Some(email) if !email.is_empty() => email.to_string(),
        _ => {
            return Err(AppError::UpstreamAuth(
                "No email in provider response".to_string(),
            ))
        }
    };

    // Name resolution borrows the raw claims, so it runs before the
    // remaining fields are moved out.
    let name = resolve_name(&identity, &email);

    let external_id = identity
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::UpstreamAuth("No user ID in provider response".to_string()))?;

    Ok(IdentityClaims {
        external_id,
        email,
        name,
        phone: identity.phone_number.filter(|p| !p.is_empty()),
        slack_id: identity.slack_id.filter(|s| !s.is_empty()),
    })
}

/// Pick a display name from whichever field the provider populated:
/// name, full_name, display_name, "first last", email local part, "User".
fn resolve_name(identity: &RawIdentity, email: &str) -> String {
    for candidate in [&identity.name, &identity.full_name, &identity.display_name] {
        if let Some(name) = candidate {
            let trimmed = name.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }

    let first = identity.first_name.as_deref().unwrap_or("").trim();
    let last = identity.last_name.as_deref().unwrap_or("").trim();
    let combined = format!("{} {}", first, last);
    let combined = combined.trim();
    if !combined.is_empty() {
        return combined.to_string();
    }

    email
        .split('@')
        .next()
        .filter(|local| !local.is_empty())
        .map(|local| local.to_string())
        .unwrap_or_else(|| "User".to_string())
}
