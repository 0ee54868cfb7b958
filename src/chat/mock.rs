//! Mock chat client for unit testing.
//!
//! Serves a scripted, newest-first message list without network access.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::types::RawMessage;
use super::ChatHistory;
use crate::error::ChatError;

/// Mock chat client for testing.
#[derive(Debug, Clone, Default)]
pub struct MockChatClient {
    /// Scripted messages, newest first.
    messages: Arc<Mutex<Vec<RawMessage>>>,
    /// Whether history requests fail.
    fail: Arc<AtomicBool>,
    /// Number of history requests served.
    calls: Arc<AtomicUsize>,
    /// Channels requested, in call order.
    channels: Arc<Mutex<Vec<String>>>,
}

impl MockChatClient {
    /// Create an empty mock client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock client serving `messages` (newest first).
    pub fn with_messages(messages: Vec<RawMessage>) -> Self {
        let client = Self::new();
        client.set_messages(messages);
        client
    }

    /// Replace the scripted messages.
    pub fn set_messages(&self, messages: Vec<RawMessage>) {
        *self.messages.lock().unwrap() = messages;
    }

    /// Post a new message on top of the history.
    pub fn post(&self, message: RawMessage) {
        self.messages.lock().unwrap().insert(0, message);
    }

    /// Make subsequent requests fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of history requests made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Channels requested so far.
    pub fn channels(&self) -> Vec<String> {
        self.channels.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatHistory for MockChatClient {
    async fn channel_history(
        &self,
        channel: &str,
        count: usize,
    ) -> Result<Vec<RawMessage>, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.channels.lock().unwrap().push(channel.to_string());

        if self.fail.load(Ordering::SeqCst) {
            return Err(ChatError::Api("mock_failure".to_string()));
        }

        let messages = self.messages.lock().unwrap();
        Ok(messages.iter().take(count).cloned().collect())
    }
}
