//! Redis-backed key-value store.
//!
//! Uses `redis::aio::ConnectionManager`, which reconnects on transient
//! failures and is cheaply cloneable, so one instance is shared by every
//! request task.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, info};
use url::Url;

use super::KeyValueStore;
use crate::error::StoreError;

/// Redis key-value store.
#[derive(Clone)]
pub struct RedisStore {
    conn: redis::aio::ConnectionManager,
}

impl RedisStore {
    /// Connect to `address` (`host:port`) with an optional password and db index.
    pub async fn connect(address: &str, password: &str, db: i64) -> Result<Self, StoreError> {
        let url = connection_url(address, password, db)?;
        let client = redis::Client::open(url.as_str())?;
        let conn = redis::aio::ConnectionManager::new(client).await?;
        info!(address = %address, db, "Connected to Redis");
        Ok(Self { conn })
    }
}

/// Build a `redis://` URL from the configured parts.
pub fn connection_url(address: &str, password: &str, db: i64) -> Result<Url, StoreError> {
    let invalid = |reason: String| StoreError::InvalidAddress {
        address: address.to_string(),
        reason,
    };

    let mut url = Url::parse(&format!("redis://{address}")).map_err(|e| invalid(e.to_string()))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    if !password.is_empty() {
        url.set_password(Some(password))
            .map_err(|_| invalid("cannot carry a password".to_string()))?;
    }
    url.set_path(&format!("/{db}"));
    Ok(url)
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let added: i64 = conn.sadd(key, member).await?;
        debug!(key, added, "SADD");
        Ok(())
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.srem(key, member).await?;
        debug!(key, removed, "SREM");
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();
        let members: Vec<String> = conn.smembers(key).await?;
        Ok(members)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        match ttl {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1)).await?,
            None => conn.set::<_, _, ()>(key, value).await?,
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }
}
