//! Single-recipient email delivery.

use std::sync::Arc;

use askama::Template;
use tracing::{error, info};
use url::Url;

use super::EmailDispatch;
use crate::email::{Mailer, OutboundEmail};
use crate::error::{StatusPageError, Upstream};
use crate::metrics;
use crate::templates::EmailBody;

/// Renders status emails and hands them to the mailer.
#[derive(Clone)]
pub struct EmailCourier {
    mailer: Arc<dyn Mailer>,
    from: String,
    subject: String,
    /// Public base URL for unsubscribe links.
    domain: Option<Url>,
}

impl EmailCourier {
    /// Create a courier sending as `from` with `subject`.
    ///
    /// `domain` is the public base URL of the service; an empty or invalid
    /// value disables unsubscribe links.
    pub fn new(mailer: Arc<dyn Mailer>, from: &str, subject: &str, domain: &str) -> Self {
        Self {
            mailer,
            from: from.to_string(),
            subject: subject.to_string(),
            domain: Url::parse(domain).ok(),
        }
    }

    /// Unsubscribe link for `recipient`, if a domain is configured.
    pub fn unsubscribe_url(&self, recipient: &str) -> Option<String> {
        let mut url = self.domain.as_ref()?.join("unsubscribe").ok()?;
        url.query_pairs_mut().append_pair("email", recipient);
        Some(url.to_string())
    }

    /// Render the email for `dispatch`.
    pub fn compose(&self, dispatch: &EmailDispatch) -> Result<OutboundEmail, StatusPageError> {
        let context = &dispatch.body_context;
        let html = EmailBody {
            message: &context.message,
            recipient: &context.recipient,
            unsubscribe_url: self.unsubscribe_url(&context.recipient),
        }
        .render()?;

        Ok(OutboundEmail {
            to: dispatch.recipient.as_str().to_string(),
            from: self.from.clone(),
            subject: self.subject.clone(),
            html,
        })
    }

    /// Render and submit one email. Failures are logged, never retried.
    pub async fn deliver_one(&self, dispatch: EmailDispatch) -> Result<(), StatusPageError> {
        let result = self.try_deliver(&dispatch).await;

        match &result {
            Ok(()) => {
                metrics::inc_deliveries_sent();
                info!(recipient = %dispatch.recipient, "Email sent");
            }
            Err(e) => {
                metrics::inc_deliveries_failed();
                if e.upstream() == Some(Upstream::Email) {
                    metrics::inc_upstream_errors(Upstream::Email);
                }
                error!(recipient = %dispatch.recipient, error = ?e, "Email delivery failed");
            }
        }

        result
    }

    async fn try_deliver(&self, dispatch: &EmailDispatch) -> Result<(), StatusPageError> {
        let email = self.compose(dispatch)?;
        let _timer = metrics::timer_email_send();
        self.mailer.send(&email).await?;
        Ok(())
    }
}
