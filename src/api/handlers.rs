//! HTTP API handlers.
//!
//! Failures are logged by the service layer and never change the response:
//! the client gets the page, a redirect, or an empty 200.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::metrics;
use crate::service::StatusPageService;

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Status page service.
    pub service: Arc<StatusPageService>,
}

impl AppState {
    /// Create new app state.
    pub fn new(service: StatusPageService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// `?email=` query. Missing means empty.
#[derive(Debug, Default, Deserialize)]
pub struct EmailQuery {
    /// Subscriber address.
    #[serde(default)]
    pub email: String,
}

/// `?status=` query. Missing means empty.
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    /// New status text.
    #[serde(default)]
    pub status: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Status page. Renders nothing when the chat service fails.
pub async fn index(State(state): State<AppState>) -> Response {
    let start = Instant::now();
    let response = match state.service.render_index().await {
        Ok(html) => Html(html).into_response(),
        Err(_) => StatusCode::OK.into_response(),
    };
    metrics::record_http_latency(start, "index");
    response
}

/// Store a new status value.
pub async fn update_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> StatusCode {
    let start = Instant::now();
    let _ = state.service.handle_update_status(&query.status).await;
    metrics::record_http_latency(start, "update_status");
    StatusCode::OK
}

/// Subscribe and send the visitor back to the page (307).
pub async fn add_email(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Redirect {
    let start = Instant::now();
    let _ = state.service.handle_subscribe(&query.email).await;
    metrics::record_http_latency(start, "add_email");
    Redirect::temporary("/")
}

/// Unsubscribe and send the visitor back to the page (301).
pub async fn unsubscribe(
    State(state): State<AppState>,
    Query(query): Query<EmailQuery>,
) -> Response {
    let start = Instant::now();
    let _ = state.service.handle_unsubscribe(&query.email).await;
    metrics::record_http_latency(start, "unsubscribe");
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, "/")]).into_response()
}

/// Write the subscriber list to the server log.
pub async fn emails_in_list(State(state): State<AppState>) -> StatusCode {
    let start = Instant::now();
    let _ = state.service.handle_list_subscribers().await;
    metrics::record_http_latency(start, "emails_in_list");
    StatusCode::OK
}

/// Broadcast the latest status to every subscriber.
pub async fn send_email(State(state): State<AppState>) -> StatusCode {
    let start = Instant::now();
    let _ = state.service.handle_broadcast().await;
    metrics::record_http_latency(start, "send_email");
    StatusCode::OK
}
