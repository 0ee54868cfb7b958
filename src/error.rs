//! Unified error types for the status page service.

use strum::{AsRefStr, Display};
use thiserror::Error;

/// Upstream collaborators the service depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Upstream {
    /// Chat history service (Slack).
    Chat,
    /// Transactional email service (SendGrid).
    Email,
    /// Key-value store (Redis).
    Store,
}

/// Unified error type for the status page service.
#[derive(Error, Debug)]
pub enum StatusPageError {
    /// Chat service unavailable or returned malformed data.
    #[error("chat service unavailable: {0}")]
    Chat(#[from] ChatError),

    /// Email service unavailable.
    #[error("email service unavailable: {0}")]
    Email(#[from] EmailError),

    /// Key-value store unavailable.
    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),

    /// Empty input that was ignored rather than rejected.
    #[error("{field} is empty, nothing to do")]
    ValidationSkipped {
        /// Name of the request field that was empty.
        field: &'static str,
    },

    /// Template rendering error.
    #[error("template error: {0}")]
    Template(#[from] askama::Error),
}

impl StatusPageError {
    /// Which upstream failed, if this is an upstream-unavailable error.
    pub fn upstream(&self) -> Option<Upstream> {
        match self {
            StatusPageError::Chat(_) => Some(Upstream::Chat),
            StatusPageError::Email(_) => Some(Upstream::Email),
            StatusPageError::Store(_) => Some(Upstream::Store),
            _ => None,
        }
    }

    /// True when an upstream call failed.
    pub fn is_upstream_unavailable(&self) -> bool {
        self.upstream().is_some()
    }

    /// True when empty input was skipped.
    pub fn is_validation_skipped(&self) -> bool {
        matches!(self, StatusPageError::ValidationSkipped { .. })
    }
}

/// Chat history errors.
#[derive(Error, Debug)]
pub enum ChatError {
    /// HTTP request failed.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("chat api returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The API answered with `ok: false`.
    #[error("chat api error: {0}")]
    Api(String),

    /// Channel has no messages to show.
    #[error("channel {channel} has no messages")]
    EmptyHistory {
        /// Channel that was queried.
        channel: String,
    },

    /// Message timestamp is not decimal Unix seconds.
    #[error("malformed message timestamp {0:?}")]
    MalformedTimestamp(String),
}

/// Transactional email errors.
#[derive(Error, Debug)]
pub enum EmailError {
    /// HTTP request failed.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API rejected the message.
    #[error("email api rejected message: HTTP {status} - {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Redis command or connection failure.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Store address could not be turned into a connection URL.
    #[error("invalid store address {address}: {reason}")]
    InvalidAddress {
        /// Configured address.
        address: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Store refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, StatusPageError>;
