//! Status page service.
//!
//! Shows a history of status updates posted to a Slack channel, lets visitors
//! subscribe an email address, and broadcasts the latest status to every
//! subscriber through SendGrid. Subscribers and the current status scalar live
//! in Redis.
//!
//! # Page rules
//!
//! ```text
//! newest first:  [ "success: all good", "db slow", "success: fixed", "outage" ]
//! latest:          "all good"            (always the newest, marker stripped)
//! history:         [ "db slow", "outage" ] (older success messages dropped)
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`chat`]: Chat history port and Slack client
//! - [`email`]: Mailer port and SendGrid client
//! - [`store`]: Key-value store port, Redis and in-memory stores, subscriber set
//! - [`status`]: Message normalization and page assembly
//! - [`broadcast`]: Delivery pool and subscriber broadcast
//! - [`service`]: Request-level orchestration
//! - [`templates`]: HTML templates
//! - [`api`]: HTTP routes
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod broadcast;
pub mod chat;
pub mod config;
pub mod email;
pub mod error;
pub mod metrics;
pub mod service;
pub mod status;
pub mod store;
pub mod templates;
pub mod utils;

pub use config::Config;
pub use error::{Result, StatusPageError};
pub use service::StatusPageService;
