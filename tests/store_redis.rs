//! Runs the store conformance suite against a live Redis server.
//!
//! Ignored by default. Point `REDIS_URL` at a disposable database and run
//! with `--ignored`; every test clears the mapping namespace.

mod common;

use redirector::domain::repositories::{MappingStore, StoreError};
use redirector::infrastructure::persistence::RedisMappingStore;
use redis::AsyncCommands;
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;

fn redis_url() -> String {
    std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/15".to_string())
}

async fn connect() -> RedisMappingStore {
    let store = RedisMappingStore::connect(&redis_url(), common::CONNECT_TIMEOUT)
        .await
        .unwrap();
    store.delete_all().await.unwrap();
    store
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Redis server"]
async fn test_put_then_get() {
    common::put_then_get_returns_same_mapping(&connect().await).await;
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Redis server"]
async fn test_get_missing() {
    common::get_missing_is_none(&connect().await).await;
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Redis server"]
async fn test_put_overwrites() {
    common::put_overwrites(&connect().await).await;
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Redis server"]
async fn test_delete() {
    common::delete_reports_existence(&connect().await).await;
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Redis server"]
async fn test_delete_all() {
    common::delete_all_returns_prior_count(&connect().await).await;
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Redis server"]
async fn test_list_and_stats() {
    common::list_matches_stats(&connect().await).await;
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Redis server"]
async fn test_repeated_get() {
    common::repeated_get_is_stable(&connect().await).await;
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Redis server"]
async fn test_closed_store() {
    common::closed_store_rejects_calls(&connect().await).await;
}

#[tokio::test]
#[serial]
#[ignore = "requires a running Redis server"]
async fn test_unlisted_records_are_not_counted() {
    let store = connect().await;

    let client = redis::Client::open(redis_url()).unwrap();
    let mut raw = redis::aio::ConnectionManager::new(client).await.unwrap();
    raw.set::<_, _, ()>("mapping::/empty", "").await.unwrap();
    raw.set::<_, _, ()>("mapping::/garbage", "not msgpack").await.unwrap();

    common::unlisted_records_are_not_counted(&store, "/empty", "/garbage").await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
#[ignore = "requires a running Redis server"]
async fn test_concurrent_puts_and_delete_all() {
    common::concurrent_puts_and_delete_all(Arc::new(connect().await)).await;
}

#[tokio::test]
async fn test_unreachable_server_is_unavailable() {
    let result = RedisMappingStore::connect("redis://127.0.0.1:1/0", Duration::from_millis(500)).await;
    assert!(matches!(result, Err(StoreError::Unavailable(_))));
}
