//! Wire types for the Slack Web API.

use serde::Deserialize;

/// A message as returned by the chat service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawMessage {
    /// Message body, possibly prefixed with the success marker.
    #[serde(default)]
    pub text: String,
    /// Decimal Unix seconds, e.g. "1512085950.000216".
    pub ts: String,
}

impl RawMessage {
    /// Build a raw message.
    pub fn new(text: impl Into<String>, ts: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ts: ts.into(),
        }
    }
}

/// `conversations.history` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    /// Whether the call succeeded.
    pub ok: bool,
    /// Error code when `ok` is false.
    #[serde(default)]
    pub error: Option<String>,
    /// Messages, newest first.
    #[serde(default)]
    pub messages: Vec<RawMessage>,
}
