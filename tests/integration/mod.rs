//! Integration tests against a live Redis.
//!
//! These tests require a reachable Redis at REDIS_ADDRESS.
//! Run with: cargo test --test integration -- --ignored
//!
//! Note: These tests write to the configured database and clean up after
//! themselves under a test-only key.

use std::time::Duration;

use status_page::store::{KeyValueStore, RedisStore};

const TEST_KEY: &str = "status-page-integration";

/// Connect using REDIS_* variables, if set.
async fn test_store() -> Option<RedisStore> {
    dotenvy::dotenv().ok();

    let address = std::env::var("REDIS_ADDRESS").ok()?;
    let password = std::env::var("REDIS_PASSWORD").unwrap_or_default();
    let db = std::env::var("REDIS_DB")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    RedisStore::connect(&address, &password, db).await.ok()
}

/// Set operations are idempotent and removing an absent member succeeds.
#[tokio::test]
#[ignore = "requires REDIS_ADDRESS"]
async fn test_set_round_trip() {
    let store = match test_store().await {
        Some(s) => s,
        None => {
            println!("Skipping: REDIS_ADDRESS not set or unreachable");
            return;
        }
    };

    store.set_remove(TEST_KEY, "a@example.com").await.unwrap();
    store.set_add(TEST_KEY, "a@example.com").await.unwrap();
    store.set_add(TEST_KEY, "a@example.com").await.unwrap();

    let members = store.set_members(TEST_KEY).await.unwrap();
    assert_eq!(members, vec!["a@example.com".to_string()]);

    store.set_remove(TEST_KEY, "a@example.com").await.unwrap();
    store.set_remove(TEST_KEY, "a@example.com").await.unwrap();
    assert!(store.set_members(TEST_KEY).await.unwrap().is_empty());
}

/// Scalars round-trip with and without expiry.
#[tokio::test]
#[ignore = "requires REDIS_ADDRESS"]
async fn test_scalar_round_trip() {
    let store = match test_store().await {
        Some(s) => s,
        None => {
            println!("Skipping: REDIS_ADDRESS not set or unreachable");
            return;
        }
    };

    let key = format!("{TEST_KEY}:scalar");
    store.set(&key, "maintenance", None).await.unwrap();
    assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("maintenance"));

    store
        .set(&key, "short-lived", Some(Duration::from_secs(1)))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(store.get(&key).await.unwrap().is_none());
}
