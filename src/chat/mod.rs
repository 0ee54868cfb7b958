//! Chat history collaborator.
//!
//! This module handles:
//! - The `ChatHistory` port the status reader depends on
//! - Slack Web API client
//! - Mock client for testing

pub mod client;
pub mod mock;
pub mod types;

use async_trait::async_trait;

use crate::error::ChatError;

pub use client::SlackClient;
pub use mock::MockChatClient;
pub use types::RawMessage;

/// Source of channel history, newest message first.
#[async_trait]
pub trait ChatHistory: Send + Sync {
    /// Fetch up to `count` of the most recent messages in `channel`.
    async fn channel_history(&self, channel: &str, count: usize)
        -> Result<Vec<RawMessage>, ChatError>;
}
