// SPDX-License-Identifier: MIT

//! Slack client for sending match-coordination DMs.

use crate::error::AppError;
use serde::Deserialize;

const SLACK_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// Minimal Slack Web API client (chat.postMessage only).
#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    bot_token: String,
    base_url: String,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
}

impl SlackClient {
    pub fn new(bot_token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            bot_token,
            base_url: SLACK_POST_MESSAGE_URL.to_string(),
        }
    }

    /// Send a direct message to a Slack member.
    pub async fn send_dm(&self, slack_member_id: &str, text: &str) -> Result<(), AppError> {
        let response = self
            .http
            .post(&self.base_url)
            .bearer_auth(&self.bot_token)
            .json(&serde_json::json!({
                "channel": slack_member_id,
                "text": text,
            }))
            .send()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Slack request failed: {}", e)))?;

        let body: PostMessageResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid Slack response: {}", e)))?;

        if !body.ok {
            let detail = body.error.unwrap_or_else(|| "unknown_error".to_string());
            return Err(AppError::Internal(anyhow::anyhow!(
                "Slack DM failed: {}",
                detail
            )));
        }

        Ok(())
    }
}
