//! Subscriber email set.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::KeyValueStore;
use crate::error::StoreError;

/// Key the subscriber set is stored under.
pub const SUBSCRIBERS_KEY: &str = "email-subscribers";

/// A non-empty subscriber address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    /// Accept `raw` as given if it is non-empty.
    ///
    /// No normalization: unsubscribe removes the exact string, so subscribe
    /// must store the exact string too.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    /// The address.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Owns the subscriber set in the key-value store.
#[derive(Clone)]
pub struct SubscriberStore {
    store: Arc<dyn KeyValueStore>,
}

impl SubscriberStore {
    /// Wrap a shared store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Add `email`. Adding a present address is a no-op.
    pub async fn add(&self, email: &SubscriberEmail) -> Result<(), StoreError> {
        self.store.set_add(SUBSCRIBERS_KEY, email.as_str()).await?;
        debug!(email = %email, "Subscriber added");
        Ok(())
    }

    /// Remove `email` as given. Absent addresses are not an error.
    pub async fn remove(&self, email: &str) -> Result<(), StoreError> {
        self.store.set_remove(SUBSCRIBERS_KEY, email).await?;
        debug!(email, "Subscriber removed");
        Ok(())
    }

    /// Current subscribers, unordered.
    pub async fn list(&self) -> Result<Vec<SubscriberEmail>, StoreError> {
        let members = self.store.set_members(SUBSCRIBERS_KEY).await?;
        Ok(members.into_iter().filter_map(|member| SubscriberEmail::parse(&member)).collect())
    }
}
