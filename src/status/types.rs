//! Status page view types.

use chrono::{DateTime, FixedOffset};

/// Display format for message timestamps, e.g. "Mar 1, 2024 at 9:30am (+00:00)".
pub const TIMESTAMP_FORMAT: &str = "%b %-d, %Y at %-I:%M%P (%:z)";

/// A normalized status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    /// Body with the success marker stripped.
    pub text: String,
    /// When the message was posted, in the display zone.
    pub timestamp: DateTime<FixedOffset>,
    /// Whether the raw message carried the success flag.
    pub is_success: bool,
}

impl StatusMessage {
    /// Human-readable timestamp.
    pub fn display_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Data the status page is rendered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageModel {
    /// Page title.
    pub title: String,
    /// Older, non-success messages, newest first.
    pub history: Vec<StatusMessage>,
    /// Most recent message.
    pub latest: StatusMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn display_timestamp_is_human_readable() {
        let offset = FixedOffset::west_opt(6 * 3600).unwrap();
        let message = StatusMessage {
            text: "ok".to_string(),
            timestamp: offset.with_ymd_and_hms(2017, 11, 30, 15, 4, 5).unwrap(),
            is_success: false,
        };
        assert_eq!(message.display_timestamp(), "Nov 30, 2017 at 3:04pm (-06:00)");
    }
}
