//! Application configuration loaded from environment variables.

use chrono::{FixedOffset, Local, Offset};
use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    // === Redis ===
    /// Redis `host:port`.
    #[serde(default = "default_redis_address")]
    pub redis_address: String,

    /// Redis password (empty for none).
    #[serde(default)]
    pub redis_password: String,

    /// Redis database index.
    #[serde(default)]
    pub redis_db: i64,

    // === Slack ===
    /// Slack API token.
    #[serde(default)]
    pub slack_token: String,

    /// Channel the status history is read from.
    #[serde(default)]
    pub slack_channel: String,

    /// Slack Web API base URL.
    #[serde(default = "default_slack_api_url")]
    pub slack_api_url: String,

    // === SendGrid ===
    /// SendGrid API key.
    #[serde(default)]
    pub sendgrid_api_key: String,

    /// SendGrid API base URL.
    #[serde(default = "default_sendgrid_api_url")]
    pub sendgrid_api_url: String,

    // === Email content ===
    /// Public base URL of this service, used for unsubscribe links.
    #[serde(default)]
    pub domain: String,

    /// Sender address.
    #[serde(default = "default_email_from")]
    pub email_from: String,

    /// Subject line for status emails.
    #[serde(default = "default_email_subject")]
    pub email_subject: String,

    // === Page ===
    /// Title shown on the status page.
    #[serde(default = "default_page_title")]
    pub page_title: String,

    /// Number of chat messages fetched for the page.
    #[serde(default = "default_history_count")]
    pub history_count: usize,

    /// Display zone offset in minutes east of UTC (host zone when unset).
    #[serde(default)]
    pub display_utc_offset_minutes: Option<i32>,

    // === Delivery ===
    /// Number of delivery worker tasks.
    #[serde(default = "default_delivery_workers")]
    pub delivery_workers: usize,

    /// Bound of the delivery queue.
    #[serde(default = "default_delivery_queue_capacity")]
    pub delivery_queue_capacity: usize,

    /// Optional timeout for upstream HTTP calls.
    #[serde(default)]
    pub http_timeout_ms: Option<u64>,

    /// Upper bound on draining pending deliveries at shutdown.
    #[serde(default = "default_shutdown_drain_secs")]
    pub shutdown_drain_secs: u64,

    // === Observability ===
    /// Enable the Prometheus exporter.
    #[serde(default)]
    pub metrics_enabled: bool,

    /// Prometheus exporter port.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

fn default_port() -> u16 {
    8080
}

fn default_redis_address() -> String {
    "localhost:6379".to_string()
}

fn default_slack_api_url() -> String {
    "https://slack.com/api".to_string()
}

fn default_sendgrid_api_url() -> String {
    "https://api.sendgrid.com".to_string()
}

fn default_email_from() -> String {
    "hello@domain.com".to_string()
}

fn default_email_subject() -> String {
    "Status Update".to_string()
}

fn default_page_title() -> String {
    "Status Page".to_string()
}

fn default_history_count() -> usize {
    10
}

fn default_delivery_workers() -> usize {
    4
}

fn default_delivery_queue_capacity() -> usize {
    256
}

fn default_shutdown_drain_secs() -> u64 {
    10
}

fn default_metrics_port() -> u16 {
    9090
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.slack_token.is_empty() {
            return Err("SLACK_TOKEN is required".to_string());
        }

        if self.slack_channel.is_empty() {
            return Err("SLACK_CHANNEL is required".to_string());
        }

        if self.sendgrid_api_key.is_empty() {
            return Err("SENDGRID_API_KEY is required".to_string());
        }

        if !self.email_from.contains('@') {
            return Err("EMAIL_FROM must be an email address".to_string());
        }

        if self.history_count == 0 {
            return Err("HISTORY_COUNT must be at least 1".to_string());
        }

        if self.delivery_workers == 0 {
            return Err("DELIVERY_WORKERS must be at least 1".to_string());
        }

        if self.delivery_queue_capacity == 0 {
            return Err("DELIVERY_QUEUE_CAPACITY must be at least 1".to_string());
        }

        if !self.domain.is_empty() && url::Url::parse(&self.domain).is_err() {
            return Err("DOMAIN must be an absolute URL".to_string());
        }

        if let Some(minutes) = self.display_utc_offset_minutes {
            if minutes.checked_mul(60).and_then(FixedOffset::east_opt).is_none() {
                return Err("DISPLAY_UTC_OFFSET_MINUTES is out of range".to_string());
            }
        }

        Ok(())
    }

    /// Zone timestamps are rendered in.
    pub fn display_offset(&self) -> FixedOffset {
        self.display_utc_offset_minutes
            .and_then(|minutes| minutes.checked_mul(60))
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Local::now().offset().fix())
    }

    /// Optional upstream request timeout.
    pub fn http_timeout(&self) -> Option<std::time::Duration> {
        self.http_timeout_ms.map(std::time::Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        envy::from_iter(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>(),
        )
        .unwrap()
    }

    fn valid_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SLACK_TOKEN", "xoxb-test"),
            ("SLACK_CHANNEL", "C0123"),
            ("SENDGRID_API_KEY", "SG.test"),
        ]
    }

    #[test]
    fn default_values_are_sensible() {
        let config = config_from(&valid_vars());
        assert_eq!(config.port, 8080);
        assert_eq!(config.redis_address, "localhost:6379");
        assert_eq!(config.redis_db, 0);
        assert_eq!(config.email_from, "hello@domain.com");
        assert_eq!(config.email_subject, "Status Update");
        assert_eq!(config.page_title, "Status Page");
        assert_eq!(config.history_count, 10);
        assert!(config.http_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_slack_token() {
        let config = config_from(&[("SLACK_CHANNEL", "C0123"), ("SENDGRID_API_KEY", "SG.test")]);
        assert_eq!(config.validate().unwrap_err(), "SLACK_TOKEN is required");
    }

    #[test]
    fn validate_rejects_relative_domain() {
        let mut vars = valid_vars();
        vars.push(("DOMAIN", "status.example.com"));
        assert!(config_from(&vars).validate().is_err());

        let mut vars = valid_vars();
        vars.push(("DOMAIN", "https://status.example.com"));
        assert!(config_from(&vars).validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_workers() {
        let mut vars = valid_vars();
        vars.push(("DELIVERY_WORKERS", "0"));
        assert!(config_from(&vars).validate().is_err());
    }

    #[test]
    fn display_offset_uses_configured_minutes() {
        let mut vars = valid_vars();
        vars.push(("DISPLAY_UTC_OFFSET_MINUTES", "-360"));
        let config = config_from(&vars);
        assert_eq!(config.display_offset().local_minus_utc(), -360 * 60);
    }
}
