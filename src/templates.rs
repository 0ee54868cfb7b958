//! Compiled HTML templates for the status page and status emails.

use askama::Template;

use crate::status::PageModel;

/// Status page.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage<'a> {
    /// Page data.
    pub page: &'a PageModel,
}

/// Status email body.
#[derive(Template)]
#[template(path = "email.html")]
pub struct EmailBody<'a> {
    /// Status text.
    pub message: &'a str,
    /// Recipient address.
    pub recipient: &'a str,
    /// Link that removes the recipient, when a public domain is configured.
    pub unsubscribe_url: Option<String>,
}

/// Render the status page.
pub fn render_index(page: &PageModel) -> askama::Result<String> {
    IndexPage { page }.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::StatusMessage;
    use chrono::{FixedOffset, TimeZone};

    fn message(text: &str, is_success: bool) -> StatusMessage {
        StatusMessage {
            text: text.to_string(),
            timestamp: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 3, 1, 9, 30, 0)
                .unwrap(),
            is_success,
        }
    }

    #[test]
    fn index_renders_latest_and_history() {
        let page = PageModel {
            title: "Status Page".to_string(),
            history: vec![message("db failover", false)],
            latest: message("all good", true),
        };

        let html = render_index(&page).unwrap();
        assert!(html.contains("<title>Status Page</title>"));
        assert!(html.contains("all good"));
        assert!(html.contains("db failover"));
        assert!(html.contains("Mar 1, 2024 at 9:30am (+00:00)"));
        assert!(html.contains("status-success"));
    }

    #[test]
    fn index_escapes_message_text() {
        let page = PageModel {
            title: "t".to_string(),
            history: Vec::new(),
            latest: message("<script>alert(1)</script>", false),
        };

        let html = render_index(&page).unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn email_includes_unsubscribe_link_when_present() {
        let body = EmailBody {
            message: "all good",
            recipient: "a@example.com",
            unsubscribe_url: Some("https://status.example.com/unsubscribe?email=a%40example.com".to_string()),
        }
        .render()
        .unwrap();
        assert!(body.contains("all good"));
        assert!(body.contains("a@example.com"));
        assert!(body.contains("unsubscribe?email=a%40example.com"));

        let body = EmailBody {
            message: "all good",
            recipient: "a@example.com",
            unsubscribe_url: None,
        }
        .render()
        .unwrap();
        assert!(!body.contains("unsubscribe"));
    }
}
