//! Request-level orchestration of the status page.
//!
//! Every handler returns a `Result` so callers can log the outcome; none of
//! these errors reach the HTTP client.

use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::broadcast::{BroadcastReport, BroadcastService};
use crate::error::{ChatError, Result, StatusPageError};
use crate::metrics;
use crate::status::{PageModel, StatusHistoryReader};
use crate::store::{KeyValueStore, SubscriberEmail, SubscriberStore, STATUS_KEY};
use crate::templates;

/// Status page request handling.
#[derive(Clone)]
pub struct StatusPageService {
    reader: StatusHistoryReader,
    subscribers: SubscriberStore,
    store: Arc<dyn KeyValueStore>,
    broadcaster: BroadcastService,
    title: String,
    history_count: usize,
}

impl StatusPageService {
    /// Create the service from its collaborators.
    pub fn new(
        reader: StatusHistoryReader,
        store: Arc<dyn KeyValueStore>,
        broadcaster: BroadcastService,
        title: &str,
        history_count: usize,
    ) -> Self {
        Self {
            reader,
            subscribers: SubscriberStore::new(store.clone()),
            store,
            broadcaster,
            title: title.to_string(),
            history_count,
        }
    }

    /// Broadcast service backing `/send-email`.
    pub fn broadcaster(&self) -> &BroadcastService {
        &self.broadcaster
    }

    /// Fetch recent history and assemble the page model.
    pub async fn page_model(&self) -> Result<PageModel> {
        self.reader
            .fetch_page(&self.title, self.history_count)
            .await?
            .ok_or_else(|| {
                StatusPageError::from(ChatError::EmptyHistory {
                    channel: self.reader.channel().to_string(),
                })
            })
    }

    /// Render the status page. On failure nothing is rendered.
    #[instrument(skip(self))]
    pub async fn render_index(&self) -> Result<String> {
        let result = self.try_render_index().await;

        match &result {
            Ok(_) => metrics::inc_page_renders(),
            Err(e) => {
                metrics::inc_page_render_failures();
                record_failure("render status page", e);
            }
        }

        result
    }

    async fn try_render_index(&self) -> Result<String> {
        let page = self.page_model().await?;
        Ok(templates::render_index(&page)?)
    }

    /// Subscribe `email`, exactly as given, when it is non-empty.
    #[instrument(skip(self))]
    pub async fn handle_subscribe(&self, email: &str) -> Result<()> {
        let result = self.try_subscribe(email).await;
        if let Err(e) = &result {
            record_failure("subscribe", e);
        }
        result
    }

    async fn try_subscribe(&self, email: &str) -> Result<()> {
        let email = SubscriberEmail::parse(email)
            .ok_or(StatusPageError::ValidationSkipped { field: "email" })?;
        self.subscribers.add(&email).await?;
        info!(email = %email, "Subscribed");
        metrics::inc_subscriptions();
        Ok(())
    }

    /// Unsubscribe `email` exactly as given.
    #[instrument(skip(self))]
    pub async fn handle_unsubscribe(&self, email: &str) -> Result<()> {
        let result = self.subscribers.remove(email).await.map_err(StatusPageError::from);

        match &result {
            Ok(()) => {
                info!(email, "Unsubscribed");
                metrics::inc_unsubscriptions();
            }
            Err(e) => record_failure("unsubscribe", e),
        }
        result
    }

    /// Store `status` under the status key when it is non-empty.
    #[instrument(skip(self))]
    pub async fn handle_update_status(&self, status: &str) -> Result<()> {
        let result = self.try_update_status(status).await;
        if let Err(e) = &result {
            record_failure("update status", e);
        }
        result
    }

    async fn try_update_status(&self, status: &str) -> Result<()> {
        if status.is_empty() {
            return Err(StatusPageError::ValidationSkipped { field: "status" });
        }
        self.store.set(STATUS_KEY, status, None).await?;
        info!(status, "Status updated");
        Ok(())
    }

    /// Write every subscriber to the process log.
    #[instrument(skip(self))]
    pub async fn handle_list_subscribers(&self) -> Result<Vec<SubscriberEmail>> {
        let result = self.subscribers.list().await.map_err(StatusPageError::from);

        match &result {
            Ok(subscribers) => {
                for email in subscribers {
                    info!(email = %email, "Subscriber");
                }
                info!(count = subscribers.len(), "Listed subscribers");
            }
            Err(e) => record_failure("list subscribers", e),
        }
        result
    }

    /// Broadcast the latest status to all subscribers.
    #[instrument(skip(self))]
    pub async fn handle_broadcast(&self) -> Result<BroadcastReport> {
        let result = self.broadcaster.broadcast_latest().await;
        if let Err(e) = &result {
            record_failure("broadcast", e);
        }
        result
    }
}

/// Log a swallowed failure once, at a level matching its kind.
fn record_failure(action: &'static str, err: &StatusPageError) {
    if err.is_validation_skipped() {
        debug!(action, reason = %err, "Skipped");
        return;
    }
    if let Some(upstream) = err.upstream() {
        metrics::inc_upstream_errors(upstream);
    }
    error!(action, error = %err, "Request failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use tracing_test::traced_test;

    use crate::broadcast::{DeliveryPool, EmailCourier};
    use crate::chat::{MockChatClient, RawMessage};
    use crate::email::MockMailer;
    use crate::store::MemoryStore;

    struct Harness {
        chat: MockChatClient,
        store: MemoryStore,
        service: StatusPageService,
    }

    fn harness() -> Harness {
        let chat = MockChatClient::new();
        let store = MemoryStore::new();
        let shared: Arc<dyn KeyValueStore> = Arc::new(store.clone());

        let reader = StatusHistoryReader::new(
            Arc::new(chat.clone()),
            "C0123",
            FixedOffset::east_opt(0).unwrap(),
        );
        let courier = EmailCourier::new(Arc::new(MockMailer::new()), "hello@domain.com", "s", "");
        let broadcaster = BroadcastService::new(
            reader.clone(),
            SubscriberStore::new(shared.clone()),
            DeliveryPool::start(courier, 1, 4),
        );

        Harness {
            chat,
            store,
            service: StatusPageService::new(reader, shared, broadcaster, "Status Page", 10),
        }
    }

    #[tokio::test]
    async fn page_model_promotes_first_message() {
        let h = harness();
        h.chat.set_messages(vec![
            RawMessage::new("success: all good", "1500000400.000000"),
            RawMessage::new("success: fixed", "1500000300.000000"),
            RawMessage::new("outage", "1500000200.000000"),
        ]);

        let page = h.service.page_model().await.unwrap();
        assert_eq!(page.latest.text, "all good");
        let history: Vec<_> = page.history.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(history, vec!["outage"]);
    }

    #[tokio::test]
    async fn render_index_fails_on_empty_channel() {
        let h = harness();
        let err = h.service.render_index().await.unwrap_err();
        assert!(err.is_upstream_unavailable());
    }

    #[tokio::test]
    async fn subscribe_skips_blank_email() {
        let h = harness();
        let err = h.service.handle_subscribe("").await.unwrap_err();
        assert!(err.is_validation_skipped());
        assert!(h.store.set_members(crate::store::SUBSCRIBERS_KEY).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_status_writes_without_expiry() {
        let h = harness();
        h.service.handle_update_status("maintenance").await.unwrap();
        assert_eq!(h.store.get(STATUS_KEY).await.unwrap().as_deref(), Some("maintenance"));

        let err = h.service.handle_update_status("").await.unwrap_err();
        assert!(err.is_validation_skipped());
        assert_eq!(h.store.get(STATUS_KEY).await.unwrap().as_deref(), Some("maintenance"));
    }

    #[tokio::test]
    async fn subscribe_failure_is_reported_not_panicked() {
        let h = harness();
        h.store.set_unavailable(true);
        let err = h.service.handle_subscribe("a@example.com").await.unwrap_err();
        assert_eq!(err.upstream(), Some(crate::error::Upstream::Store));
    }

    #[tokio::test]
    async fn list_subscribers_returns_members() {
        let h = harness();
        h.service.handle_subscribe("a@example.com").await.unwrap();
        h.service.handle_subscribe("b@example.com").await.unwrap();
        h.service.handle_unsubscribe("a@example.com").await.unwrap();

        let listed = h.service.handle_list_subscribers().await.unwrap();
        assert_eq!(listed, vec![SubscriberEmail::parse("b@example.com").unwrap()]);
    }

    #[tokio::test]
    async fn unsubscribe_undoes_padded_subscribe() {
        let h = harness();
        h.service.handle_subscribe(" a@example.com").await.unwrap();
        h.service.handle_unsubscribe(" a@example.com").await.unwrap();

        assert!(h.store.set_members(crate::store::SUBSCRIBERS_KEY).await.unwrap().is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn chat_failure_logs_exactly_one_error() {
        let h = harness();
        h.service.handle_update_status("maintenance").await.unwrap();
        h.service.handle_subscribe("a@example.com").await.unwrap();
        h.chat.set_failing(true);

        assert!(h.service.render_index().await.is_err());

        logs_assert(|lines: &[&str]| {
            let errors: Vec<_> = lines.iter().filter(|line| line.contains("ERROR")).collect();
            match errors.as_slice() {
                [line] if line.contains("render status page") => Ok(()),
                other => Err(format!("expected one render error, got {other:?}")),
            }
        });
        assert_eq!(h.store.get(STATUS_KEY).await.unwrap().as_deref(), Some("maintenance"));
        assert_eq!(
            h.store.set_members(crate::store::SUBSCRIBERS_KEY).await.unwrap(),
            vec!["a@example.com".to_string()]
        );
    }
}
