//! In-memory key-value store.
//!
//! Backs tests and local runs without Redis. Sets and scalars live in
//! separate maps; each operation touches a single shard entry, which matches
//! the per-key atomicity Redis gives.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use super::KeyValueStore;
use crate::error::StoreError;

#[derive(Debug, Clone)]
struct Scalar {
    value: String,
    expires_at: Option<Instant>,
}

/// In-memory key-value store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sets: Arc<DashMap<String, HashSet<String>>>,
    scalars: Arc<DashMap<String, Scalar>>,
    /// Whether operations fail as if the server were down.
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent operations fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store marked unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError> {
        self.check()?;
        self.sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<(), StoreError> {
        self.check()?;
        if let Some(mut set) = self.sets.get_mut(key) {
            set.remove(member);
        }
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.check()?;
        Ok(self
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        self.check()?;
        self.scalars.insert(
            key.to_string(),
            Scalar {
                value: value.to_string(),
                expires_at: ttl.map(|ttl| Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        let expired = match self.scalars.get(key) {
            None => return Ok(None),
            Some(scalar) => match scalar.expires_at {
                Some(at) if at <= Instant::now() => true,
                _ => return Ok(Some(scalar.value.clone())),
            },
        };
        if expired {
            self.scalars.remove(key);
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_semantics() {
        let store = MemoryStore::new();
        store.set_add("k", "a").await.unwrap();
        store.set_add("k", "a").await.unwrap();
        store.set_add("k", "b").await.unwrap();

        let mut members = store.set_members("k").await.unwrap();
        members.sort();
        assert_eq!(members, vec!["a".to_string(), "b".to_string()]);

        store.set_remove("k", "a").await.unwrap();
        store.set_remove("k", "missing").await.unwrap();
        store.set_remove("other", "a").await.unwrap();
        assert_eq!(store.set_members("k").await.unwrap(), vec!["b".to_string()]);
        assert!(store.set_members("other").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn scalar_without_ttl_persists() {
        let store = MemoryStore::new();
        store.set("status", "ok", None).await.unwrap();
        assert_eq!(store.get("status").await.unwrap().as_deref(), Some("ok"));
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn scalar_with_elapsed_ttl_expires() {
        let store = MemoryStore::new();
        store.set("k", "v", Some(Duration::ZERO)).await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_operation() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(store.set_add("k", "a").await.is_err());
        assert!(store.set_members("k").await.is_err());
        assert!(store.set("k", "v", None).await.is_err());
    }
}
