//! SendGrid v3 mail client.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};

use super::{Mailer, OutboundEmail};
use crate::error::EmailError;

/// SendGrid `/v3/mail/send` client.
#[derive(Debug, Clone)]
pub struct SendGridClient {
    /// Shared HTTP client.
    http: reqwest::Client,
    /// API base URL, without trailing slash.
    api_url: String,
    /// API key.
    api_key: String,
}

#[derive(Debug, Serialize)]
struct MailSendRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

impl<'a> From<&'a OutboundEmail> for MailSendRequest<'a> {
    fn from(email: &'a OutboundEmail) -> Self {
        Self {
            personalizations: [Personalization {
                to: [Address { email: &email.to }],
            }],
            from: Address { email: &email.from },
            subject: &email.subject,
            content: [Content {
                content_type: "text/html",
                value: &email.html,
            }],
        }
    }
}

impl SendGridClient {
    /// Create a client against `api_url` (e.g. `https://api.sendgrid.com`).
    pub fn new(http: reqwest::Client, api_url: &str, api_key: &str) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl Mailer for SendGridClient {
    #[instrument(skip(self, email), fields(to = %email.to))]
    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailError> {
        let url = format!("{}/v3/mail/send", self.api_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&MailSendRequest::from(email))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = %status, "Mail accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn request_body_matches_v3_shape() {
        let email = OutboundEmail {
            to: "a@example.com".to_string(),
            from: "hello@domain.com".to_string(),
            subject: "Status Update".to_string(),
            html: "<p>all good</p>".to_string(),
        };

        let body = serde_json::to_value(MailSendRequest::from(&email)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "personalizations": [{"to": [{"email": "a@example.com"}]}],
                "from": {"email": "hello@domain.com"},
                "subject": "Status Update",
                "content": [{"type": "text/html", "value": "<p>all good</p>"}]
            })
        );
    }
}
