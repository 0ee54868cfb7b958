//! Recording mailer for unit testing.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{Mailer, OutboundEmail};
use crate::error::EmailError;

/// Mailer that records every accepted email instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct MockMailer {
    /// Accepted emails, in submission order.
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
    /// Recipients whose sends are rejected.
    rejected: Arc<Mutex<HashSet<String>>>,
    /// Total send attempts, accepted or not.
    attempts: Arc<Mutex<Vec<String>>>,
}

impl MockMailer {
    /// Create an empty recording mailer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every send addressed to `recipient`.
    pub fn reject(&self, recipient: &str) {
        self.rejected.lock().unwrap().insert(recipient.to_string());
    }

    /// Emails accepted so far.
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }

    /// Recipients of every attempt so far, including rejected ones.
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailError> {
        self.attempts.lock().unwrap().push(email.to.clone());

        if self.rejected.lock().unwrap().contains(&email.to) {
            return Err(EmailError::Rejected {
                status: 400,
                body: format!("mock rejected {}", email.to),
            });
        }

        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}
