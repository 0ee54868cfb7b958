//! Slack Web API client.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::types::{HistoryResponse, RawMessage};
use super::ChatHistory;
use crate::error::ChatError;

/// Slack `conversations.history` client.
#[derive(Debug, Clone)]
pub struct SlackClient {
    /// Shared HTTP client.
    http: reqwest::Client,
    /// Web API base URL, without trailing slash.
    api_url: String,
    /// Bot or user token.
    token: String,
}

impl SlackClient {
    /// Create a client against `api_url` (e.g. `https://slack.com/api`).
    pub fn new(http: reqwest::Client, api_url: &str, token: &str) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// Get the API base URL.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl ChatHistory for SlackClient {
    #[instrument(skip(self))]
    async fn channel_history(
        &self,
        channel: &str,
        count: usize,
    ) -> Result<Vec<RawMessage>, ChatError> {
        let url = format!("{}/conversations.history", self.api_url);
        let limit = count.to_string();

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("channel", channel), ("limit", limit.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Slack history request failed");
            return Err(ChatError::Status {
                status: response.status().as_u16(),
            });
        }

        let history: HistoryResponse = response.json().await?;

        if !history.ok {
            return Err(ChatError::Api(
                history.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }

        let mut messages = history.messages;
        messages.truncate(count);

        debug!(count = messages.len(), "Retrieved channel history");

        Ok(messages)
    }
}
