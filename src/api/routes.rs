//! HTTP API route definitions.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{
    add_email, emails_in_list, health, index, send_email, unsubscribe, update_status, AppState,
};

/// Create the API router.
///
/// Every route is query-parameter driven and answers GET.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/update-status", get(update_status))
        .route("/add-email", get(add_email))
        .route("/unsubscribe", get(unsubscribe))
        .route("/emails-in-list", get(emails_in_list))
        .route("/send-email", get(send_email))
        // Health endpoint
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
