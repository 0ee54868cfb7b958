//! Bounded delivery queue drained by a fixed set of worker tasks.
//!
//! Submitting never waits: a feeder task moves dispatches into the queue as
//! capacity frees up.
//! Deliveries from different workers complete in no particular order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex, Notify};
use tracing::{debug, info, warn};

use super::courier::EmailCourier;
use super::EmailDispatch;
use crate::metrics;

/// Counts accepted dispatches that have not been attempted yet.
#[derive(Debug, Default)]
struct Outstanding {
    pending: AtomicUsize,
    idle: Notify,
}

impl Outstanding {
    fn begin(&self, count: usize) {
        self.pending.fetch_add(count, Ordering::SeqCst);
    }

    fn finish(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Worker pool delivering status emails.
#[derive(Clone)]
pub struct DeliveryPool {
    sender: mpsc::Sender<EmailDispatch>,
    outstanding: Arc<Outstanding>,
    workers: usize,
}

impl DeliveryPool {
    /// Spawn `workers` delivery tasks behind a queue of `capacity` dispatches.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(courier: EmailCourier, workers: usize, capacity: usize) -> Self {
        let workers = workers.max(1);
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let outstanding = Arc::new(Outstanding::default());

        for id in 0..workers {
            tokio::spawn(run_worker(
                id,
                receiver.clone(),
                courier.clone(),
                outstanding.clone(),
            ));
        }

        info!(workers, capacity, "Delivery pool started");

        Self {
            sender,
            outstanding,
            workers,
        }
    }

    /// Number of worker tasks.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Dispatches accepted but not yet attempted.
    pub fn pending(&self) -> usize {
        self.outstanding.pending.load(Ordering::SeqCst)
    }

    /// Hand `dispatches` to the workers and return without waiting.
    ///
    /// Every dispatch counts as pending from this call on. A feeder task
    /// waits for queue capacity, so a full queue never blocks the caller.
    /// Returns the number of dispatches accepted.
    pub fn submit_all(&self, dispatches: Vec<EmailDispatch>) -> usize {
        let accepted = dispatches.len();
        if accepted == 0 {
            return 0;
        }

        self.outstanding.begin(accepted);
        tokio::spawn(feed(self.sender.clone(), dispatches, self.outstanding.clone()));

        accepted
    }

    /// Resolve once every accepted dispatch has been attempted.
    pub async fn wait_idle(&self) {
        loop {
            let idle = self.outstanding.idle.notified();
            if self.pending() == 0 {
                return;
            }
            idle.await;
        }
    }
}

async fn feed(
    sender: mpsc::Sender<EmailDispatch>,
    dispatches: Vec<EmailDispatch>,
    outstanding: Arc<Outstanding>,
) {
    for dispatch in dispatches {
        let recipient = dispatch.recipient.clone();
        if sender.send(dispatch).await.is_err() {
            metrics::inc_deliveries_failed();
            warn!(recipient = %recipient, "Delivery pool closed, dispatch dropped");
            outstanding.finish();
        }
    }
}

async fn run_worker(
    id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<EmailDispatch>>>,
    courier: EmailCourier,
    outstanding: Arc<Outstanding>,
) {
    loop {
        let next = receiver.lock().await.recv().await;
        let Some(dispatch) = next else {
            break;
        };

        // Outcome is logged by the courier.
        let _ = courier.deliver_one(dispatch).await;
        outstanding.finish();
    }

    debug!(worker = id, "Delivery worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::email::{Mailer, MockMailer, OutboundEmail};
    use crate::error::EmailError;
    use crate::store::SubscriberEmail;

    /// Mailer whose sends never complete.
    struct StalledMailer;

    #[async_trait]
    impl Mailer for StalledMailer {
        async fn send(&self, _email: &OutboundEmail) -> Result<(), EmailError> {
            std::future::pending().await
        }
    }

    fn courier(mailer: Arc<dyn Mailer>) -> EmailCourier {
        EmailCourier::new(mailer, "hello@domain.com", "Status Update", "")
    }

    fn dispatch(to: &str) -> EmailDispatch {
        EmailDispatch::new(SubscriberEmail::parse(to).unwrap(), "all good")
    }

    fn dispatches(count: usize) -> Vec<EmailDispatch> {
        (0..count)
            .map(|i| dispatch(&format!("user{i}@example.com")))
            .collect()
    }

    #[tokio::test]
    async fn wait_idle_returns_immediately_when_empty() {
        let pool = DeliveryPool::start(courier(Arc::new(MockMailer::new())), 2, 4);
        assert_eq!(pool.submit_all(Vec::new()), 0);
        pool.wait_idle().await;
        assert_eq!(pool.pending(), 0);
        assert_eq!(pool.workers(), 2);
    }

    #[tokio::test]
    async fn delivers_every_submission_beyond_capacity() {
        let mailer = MockMailer::new();
        let pool = DeliveryPool::start(courier(Arc::new(mailer.clone())), 3, 2);

        assert_eq!(pool.submit_all(dispatches(10)), 10);
        pool.wait_idle().await;

        let mut recipients: Vec<_> = mailer.sent().into_iter().map(|e| e.to).collect();
        recipients.sort();
        let mut expected: Vec<_> = (0..10).map(|i| format!("user{i}@example.com")).collect();
        expected.sort();
        assert_eq!(recipients, expected);
    }

    #[tokio::test]
    async fn submit_all_does_not_wait_for_stalled_deliveries() {
        let pool = DeliveryPool::start(courier(Arc::new(StalledMailer)), 1, 1);

        let accepted = tokio::time::timeout(Duration::from_secs(1), async {
            pool.submit_all(dispatches(4))
        })
        .await
        .unwrap();

        assert_eq!(accepted, 4);
        assert_eq!(pool.pending(), 4);
        assert!(tokio::time::timeout(Duration::from_millis(50), pool.wait_idle())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn failed_delivery_does_not_stop_siblings() {
        let mailer = MockMailer::new();
        mailer.reject("bad@example.com");
        let pool = DeliveryPool::start(courier(Arc::new(mailer.clone())), 1, 8);

        pool.submit_all(vec![dispatch("bad@example.com"), dispatch("good@example.com")]);
        pool.wait_idle().await;

        assert_eq!(mailer.attempts().len(), 2);
        let sent: Vec<_> = mailer.sent().into_iter().map(|e| e.to).collect();
        assert_eq!(sent, vec!["good@example.com".to_string()]);
    }
}
