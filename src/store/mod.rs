//! Key-value store collaborator and the subscriber set built on it.
//!
//! This module handles:
//! - The `KeyValueStore` port (set + scalar operations)
//! - Redis-backed implementation
//! - In-memory implementation for tests and local runs
//! - `SubscriberStore`, which owns the subscriber email set

pub mod memory;
pub mod redis_store;
pub mod subscribers;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use subscribers::{SubscriberEmail, SubscriberStore, SUBSCRIBERS_KEY};

/// Key the current status scalar is written under.
pub const STATUS_KEY: &str = "status";

/// Remote key-value store used as a set and scalar store.
///
/// Individual operations are assumed atomic on the server side.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Add `member` to the set at `key`.
    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError>;

    /// Remove `member` from the set at `key`; absent members are ignored.
    async fn set_remove(&self, key: &str, member: &str) -> Result<(), StoreError>;

    /// All members of the set at `key`, unordered.
    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// Write a scalar. `None` means no expiry.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Read a scalar.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
}
