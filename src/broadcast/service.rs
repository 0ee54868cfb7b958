//! Broadcast of the latest status to every subscriber.

use tracing::{info, instrument};

use super::pool::DeliveryPool;
use super::EmailDispatch;
use crate::error::StatusPageError;
use crate::metrics;
use crate::status::StatusHistoryReader;
use crate::store::SubscriberStore;

/// What a broadcast handed to the delivery pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Status text that was sent.
    pub message: String,
    /// Dispatches handed to the pool.
    pub queued: usize,
}

/// Sends the latest status to all subscribers.
#[derive(Clone)]
pub struct BroadcastService {
    reader: StatusHistoryReader,
    subscribers: SubscriberStore,
    pool: DeliveryPool,
}

impl BroadcastService {
    /// Create a broadcast service.
    pub fn new(reader: StatusHistoryReader, subscribers: SubscriberStore, pool: DeliveryPool) -> Self {
        Self {
            reader,
            subscribers,
            pool,
        }
    }

    /// Delivery pool used for sends.
    pub fn pool(&self) -> &DeliveryPool {
        &self.pool
    }

    /// Fetch the newest status and queue one email per subscriber.
    ///
    /// Returns as soon as the dispatches are handed to the pool; it never
    /// waits for queue capacity or for a delivery. Only the status fetch and
    /// the subscriber listing abort the broadcast.
    #[instrument(skip(self))]
    pub async fn broadcast_latest(&self) -> Result<BroadcastReport, StatusPageError> {
        let message = self.reader.fetch_newest_text().await?;
        info!(status = %message, "Sending status");
        metrics::inc_broadcasts();

        let dispatches = self
            .subscribers
            .list()
            .await?
            .into_iter()
            .map(|recipient| EmailDispatch::new(recipient, &message))
            .collect();
        let queued = self.pool.submit_all(dispatches);

        info!(queued, "Broadcast queued");
        Ok(BroadcastReport { message, queued })
    }
}
