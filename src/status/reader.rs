//! Reads status history from the chat service.

use std::sync::Arc;
use std::time::Instant;

use chrono::FixedOffset;
use tracing::{debug, instrument};

use super::normalize::{assemble_page, strip_marker};
use super::types::PageModel;
use crate::chat::{ChatHistory, RawMessage};
use crate::error::ChatError;
use crate::metrics;

/// Fetches and normalizes recent status messages for one channel.
#[derive(Clone)]
pub struct StatusHistoryReader {
    chat: Arc<dyn ChatHistory>,
    channel: String,
    offset: FixedOffset,
}

impl StatusHistoryReader {
    /// Read `channel` through `chat`, rendering timestamps in `offset`.
    pub fn new(chat: Arc<dyn ChatHistory>, channel: &str, offset: FixedOffset) -> Self {
        Self {
            chat,
            channel: channel.to_string(),
            offset,
        }
    }

    /// Channel this reader fetches from.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// The `count` most recent raw messages, newest first.
    #[instrument(skip(self), fields(channel = %self.channel))]
    pub async fn fetch_latest(&self, count: usize) -> Result<Vec<RawMessage>, ChatError> {
        let start = Instant::now();
        let raw = self.chat.channel_history(&self.channel, count).await;
        metrics::record_chat_fetch_latency(start);

        let messages = raw?;
        debug!(count = messages.len(), "Fetched status history");
        Ok(messages)
    }

    /// Page model built from the `count` most recent messages.
    ///
    /// `None` when the channel has no messages.
    pub async fn fetch_page(&self, title: &str, count: usize) -> Result<Option<PageModel>, ChatError> {
        let messages = self.fetch_latest(count).await?;
        assemble_page(title, &messages, self.offset)
    }

    /// Text of the single most recent message with the marker stripped.
    ///
    /// The timestamp is not read, so a malformed one does not matter here.
    pub async fn fetch_newest_text(&self) -> Result<String, ChatError> {
        self.fetch_latest(1)
            .await?
            .first()
            .map(|message| strip_marker(&message.text))
            .ok_or_else(|| ChatError::EmptyHistory {
                channel: self.channel.clone(),
            })
    }
}
