//! Subscriber broadcast: fan the latest status out as one email per subscriber.
//!
//! - [`courier`]: renders and submits a single email
//! - [`pool`]: bounded queue drained by fixed worker tasks
//! - [`service`]: fetches the latest status and enqueues one dispatch per subscriber

pub mod courier;
pub mod pool;
pub mod service;

use crate::store::SubscriberEmail;

pub use courier::EmailCourier;
pub use pool::DeliveryPool;
pub use service::{BroadcastReport, BroadcastService};

/// Values the email body is rendered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyContext {
    /// Status text with the marker stripped.
    pub message: String,
    /// Recipient address.
    pub recipient: String,
}

/// One pending email to one subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDispatch {
    /// Who receives it.
    pub recipient: SubscriberEmail,
    /// Template context.
    pub body_context: BodyContext,
}

impl EmailDispatch {
    /// Dispatch of `message` to `recipient`.
    pub fn new(recipient: SubscriberEmail, message: &str) -> Self {
        let body_context = BodyContext {
            message: message.to_string(),
            recipient: recipient.as_str().to_string(),
        };
        Self {
            recipient,
            body_context,
        }
    }
}
