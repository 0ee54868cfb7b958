//! Message normalization and page assembly rules.

use chrono::{DateTime, FixedOffset};

use super::types::{PageModel, StatusMessage};
use crate::chat::RawMessage;
use crate::error::ChatError;

/// Marker stripped from message bodies.
pub const SUCCESS_MARKER: &str = "success: ";

/// Substring that flags a message as a success.
pub const SUCCESS_FLAG: &str = "success";

/// Length of the whole-seconds prefix of a chat timestamp.
const SECONDS_DIGITS: usize = 10;

/// Remove the first occurrence of the success marker.
pub fn strip_marker(raw: &str) -> String {
    raw.replacen(SUCCESS_MARKER, "", 1)
}

/// Whether the raw (unstripped) text carries the success flag.
pub fn is_success(raw: &str) -> bool {
    raw.contains(SUCCESS_FLAG)
}

/// Parse the leading Unix-seconds of a chat timestamp into `offset`.
pub fn parse_timestamp(ts: &str, offset: FixedOffset) -> Result<DateTime<FixedOffset>, ChatError> {
    let malformed = || ChatError::MalformedTimestamp(ts.to_string());

    let seconds: i64 = ts
        .get(..SECONDS_DIGITS)
        .ok_or_else(malformed)?
        .parse()
        .map_err(|_| malformed())?;

    DateTime::from_timestamp(seconds, 0)
        .map(|utc| utc.with_timezone(&offset))
        .ok_or_else(malformed)
}

/// Turn a raw chat message into a status message.
pub fn normalize(raw: &RawMessage, offset: FixedOffset) -> Result<StatusMessage, ChatError> {
    Ok(StatusMessage {
        text: strip_marker(&raw.text),
        timestamp: parse_timestamp(&raw.ts, offset)?,
        is_success: is_success(&raw.text),
    })
}

/// Build the page from newest-first raw messages.
///
/// The first message is always `latest`, whatever its flag. Later messages
/// make it into `history` only when they are not success messages. Only
/// messages that end up on the page have their timestamps parsed.
pub fn assemble_page(
    title: &str,
    messages: &[RawMessage],
    offset: FixedOffset,
) -> Result<Option<PageModel>, ChatError> {
    let Some((first, rest)) = messages.split_first() else {
        return Ok(None);
    };

    let latest = normalize(first, offset)?;
    let history = rest
        .iter()
        .filter(|message| !is_success(&message.text))
        .map(|message| normalize(message, offset))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(PageModel {
        title: title.to_string(),
        history,
        latest,
    }))
}
