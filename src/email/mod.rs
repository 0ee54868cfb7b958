//! Transactional email collaborator.

pub mod client;
pub mod mock;

use async_trait::async_trait;

use crate::error::EmailError;

pub use client::SendGridClient;
pub use mock::MockMailer;

/// A fully rendered email ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    /// Recipient address.
    pub to: String,
    /// Sender address.
    pub from: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}

/// Submits emails to a delivery service.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Submit one email. Success means the service accepted it.
    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailError>;
}
