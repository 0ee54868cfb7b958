//! Prometheus metrics for the status page and broadcast workflow.
//!
//! This module provides metrics for:
//! - HTTP request latency per endpoint
//! - Chat history fetch and email send latency
//! - Page renders, subscriptions and broadcasts
//! - Delivery outcomes and upstream failures

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use tracing::debug;

use crate::error::Upstream;

// === Metric Name Constants ===

/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// Chat history fetch latency metric name.
pub const METRIC_CHAT_FETCH_LATENCY: &str = "chat_fetch_latency_ms";
/// Email send latency metric name.
pub const METRIC_EMAIL_SEND_LATENCY: &str = "email_send_latency_ms";
/// Pages rendered counter metric name.
pub const METRIC_PAGE_RENDERS: &str = "page_renders_total";
/// Page render failures counter metric name.
pub const METRIC_PAGE_RENDER_FAILURES: &str = "page_render_failures_total";
/// Subscriptions counter metric name.
pub const METRIC_SUBSCRIPTIONS: &str = "subscriptions_total";
/// Unsubscriptions counter metric name.
pub const METRIC_UNSUBSCRIPTIONS: &str = "unsubscriptions_total";
/// Broadcasts started counter metric name.
pub const METRIC_BROADCASTS: &str = "broadcasts_total";
/// Deliveries accepted by the email service counter metric name.
pub const METRIC_DELIVERIES_SENT: &str = "deliveries_sent_total";
/// Deliveries that failed counter metric name.
pub const METRIC_DELIVERIES_FAILED: &str = "deliveries_failed_total";
/// Upstream failures counter metric name.
pub const METRIC_UPSTREAM_ERRORS: &str = "upstream_errors_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );
    describe_histogram!(
        METRIC_CHAT_FETCH_LATENCY,
        "Chat history fetch latency in milliseconds"
    );
    describe_histogram!(
        METRIC_EMAIL_SEND_LATENCY,
        "Email send latency in milliseconds"
    );

    describe_counter!(METRIC_PAGE_RENDERS, "Total number of status pages rendered");
    describe_counter!(
        METRIC_PAGE_RENDER_FAILURES,
        "Total number of status page renders aborted"
    );
    describe_counter!(METRIC_SUBSCRIPTIONS, "Total number of subscribe requests stored");
    describe_counter!(METRIC_UNSUBSCRIPTIONS, "Total number of unsubscribe requests stored");
    describe_counter!(METRIC_BROADCASTS, "Total number of broadcasts started");
    describe_counter!(
        METRIC_DELIVERIES_SENT,
        "Total number of emails accepted by the email service"
    );
    describe_counter!(METRIC_DELIVERIES_FAILED, "Total number of failed email deliveries");
    describe_counter!(METRIC_UPSTREAM_ERRORS, "Total number of upstream call failures");

    debug!("Metrics initialized");
}

/// Install the Prometheus exporter listening on `addr`.
pub fn install_prometheus(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()
}

/// Record HTTP request latency.
pub fn record_http_latency(start: Instant, endpoint: &'static str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_HTTP_REQUEST_LATENCY, "endpoint" => endpoint).record(latency_ms);
}

/// Record chat history fetch latency.
pub fn record_chat_fetch_latency(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_CHAT_FETCH_LATENCY).record(latency_ms);
}

/// Increment pages rendered counter.
pub fn inc_page_renders() {
    counter!(METRIC_PAGE_RENDERS).increment(1);
}

/// Increment page render failures counter.
pub fn inc_page_render_failures() {
    counter!(METRIC_PAGE_RENDER_FAILURES).increment(1);
}

/// Increment subscriptions counter.
pub fn inc_subscriptions() {
    counter!(METRIC_SUBSCRIPTIONS).increment(1);
}

/// Increment unsubscriptions counter.
pub fn inc_unsubscriptions() {
    counter!(METRIC_UNSUBSCRIPTIONS).increment(1);
}

/// Increment broadcasts counter.
pub fn inc_broadcasts() {
    counter!(METRIC_BROADCASTS).increment(1);
}

/// Increment deliveries sent counter.
pub fn inc_deliveries_sent() {
    counter!(METRIC_DELIVERIES_SENT).increment(1);
}

/// Increment deliveries failed counter.
pub fn inc_deliveries_failed() {
    counter!(METRIC_DELIVERIES_FAILED).increment(1);
}

/// Increment upstream errors counter for `upstream`.
pub fn inc_upstream_errors(upstream: Upstream) {
    counter!(METRIC_UPSTREAM_ERRORS, "upstream" => upstream.as_ref().to_string()).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        histogram!(self.metric_name).record(latency_ms);
    }
}

/// Create a latency timer for email sends.
pub fn timer_email_send() -> LatencyTimer {
    LatencyTimer::new(METRIC_EMAIL_SEND_LATENCY)
}
