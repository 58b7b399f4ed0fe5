#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use redirector::config::{Config, DatabaseDriver};
use redirector::domain::entities::Mapping;
use redirector::domain::repositories::{MappingStore, StoreError};
use redirector::domain::template::ViewBag;
use redirector::infrastructure::persistence::RedbMappingStore;
use redirector::state::AppState;

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Opens a redb store in a fresh temporary directory.
///
/// The directory is removed when the returned guard drops.
pub async fn open_temp_store() -> (TempDir, Arc<dyn MappingStore>) {
    let dir = tempfile::tempdir().unwrap();
    let store = RedbMappingStore::open(dir.path().join("mappings.redb"), CONNECT_TIMEOUT)
        .await
        .unwrap();
    (dir, Arc::new(store))
}

pub fn test_config() -> Config {
    Config {
        database_driver: DatabaseDriver::Redb,
        database_path: "./test.redb".to_string(),
        db_connect_timeout: 1,
        listen_addr: "127.0.0.1:0".to_string(),
        mgmt_listen_addr: "127.0.0.1:1".to_string(),
        key_builder: "path".to_string(),
        default_key: None,
        destination_prefix: None,
        view_bag: ViewBag::new(),
        log_level: "info".to_string(),
        log_format: "text".to_string(),
        log_file: None,
        access_log_file: None,
    }
}

pub fn create_test_state(store: Arc<dyn MappingStore>, config: &Config) -> AppState {
    AppState::new(store, config).unwrap()
}

pub async fn seed(store: &dyn MappingStore, mappings: &[Mapping]) {
    for mapping in mappings {
        store.put(mapping).await.unwrap();
    }
}

// Store conformance suite. Every backend runs each of these against a store
// it owns exclusively.

pub async fn put_then_get_returns_same_mapping(store: &dyn MappingStore) {
    let plain = Mapping::new("/x", "/y", false);
    let full = Mapping::new("/t", "/?key={{ .Key }}", true).with_comment("templated");

    seed(store, &[plain.clone(), full.clone()]).await;

    assert_eq!(store.get("/x").await.unwrap(), Some(plain));
    assert_eq!(store.get("/t").await.unwrap(), Some(full));
}

pub async fn get_missing_is_none(store: &dyn MappingStore) {
    assert_eq!(store.get("/never-written").await.unwrap(), None);
}

pub async fn put_overwrites(store: &dyn MappingStore) {
    store.put(&Mapping::new("/x", "/first", false)).await.unwrap();
    store.put(&Mapping::new("/x", "/second", true)).await.unwrap();

    let mapping = store.get("/x").await.unwrap().unwrap();
    assert_eq!(mapping.destination, "/second");
    assert!(mapping.permanent);
    assert_eq!(store.list().await.unwrap().len(), 1);
}

pub async fn delete_reports_existence(store: &dyn MappingStore) {
    store.put(&Mapping::new("/x", "/y", false)).await.unwrap();

    assert!(store.delete("/x").await.unwrap());
    assert!(!store.delete("/x").await.unwrap());
    assert_eq!(store.get("/x").await.unwrap(), None);
}

pub async fn delete_all_returns_prior_count(store: &dyn MappingStore) {
    seed(
        store,
        &[
            Mapping::new("/a", "/1", false),
            Mapping::new("/b", "/2", false),
            Mapping::new("/c", "/3", true),
        ],
    )
    .await;

    assert_eq!(store.delete_all().await.unwrap(), 3);
    assert!(store.list().await.unwrap().is_empty());
    assert_eq!(store.stats().await.unwrap().total_mappings, 0);
    assert_eq!(store.delete_all().await.unwrap(), 0);
}

pub async fn list_matches_stats(store: &dyn MappingStore) {
    seed(
        store,
        &[
            Mapping::new("/a", "/1", false),
            Mapping::new("https://h/b?q=1", "/2", false),
        ],
    )
    .await;

    let mut keys: Vec<_> = store
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.key)
        .collect();
    keys.sort();

    assert_eq!(keys, vec!["/a".to_string(), "https://h/b?q=1".to_string()]);
    assert_eq!(store.stats().await.unwrap().total_mappings, 2);
}

pub async fn repeated_get_is_stable(store: &dyn MappingStore) {
    store.put(&Mapping::new("/x", "/y", true)).await.unwrap();

    let first = store.get("/x").await.unwrap();
    let second = store.get("/x").await.unwrap();
    assert_eq!(first, second);
}

pub async fn closed_store_rejects_calls(store: &dyn MappingStore) {
    store.close().await.unwrap();

    assert!(matches!(store.get("/x").await, Err(StoreError::Closed)));
    assert!(matches!(
        store.put(&Mapping::new("/x", "/y", false)).await,
        Err(StoreError::Closed)
    ));
    assert!(matches!(store.list().await, Err(StoreError::Closed)));
}

/// Runs against a store where the caller planted an empty payload under
/// `empty_key` and an undecodable one under `garbage_key`.
pub async fn unlisted_records_are_not_counted(
    store: &dyn MappingStore,
    empty_key: &str,
    garbage_key: &str,
) {
    store.put(&Mapping::new("/a", "/b", false)).await.unwrap();

    assert_eq!(store.get(empty_key).await.unwrap(), None);
    assert_eq!(store.list().await.unwrap().len(), 1);
    assert_eq!(store.stats().await.unwrap().total_mappings, 1);

    assert!(!store.delete(empty_key).await.unwrap());
    assert_eq!(store.delete_all().await.unwrap(), 1);
    assert!(store.list().await.unwrap().is_empty());
    assert!(!store.delete(garbage_key).await.unwrap());
}

pub fn numbered_mapping(i: usize) -> Mapping {
    Mapping::new(format!("/k{i}"), format!("/dest/{i}"), i % 2 == 0).with_comment(format!("#{i}"))
}

/// Interleaves writers, readers and one `delete_all`. Every write lands
/// either before the wipe (and is counted by it) or after (and is listed).
pub async fn concurrent_puts_and_delete_all(store: Arc<dyn MappingStore>) {
    const WRITERS: usize = 64;

    let mut tasks = Vec::new();
    let mut wipe = None;
    for i in 0..WRITERS {
        if i == WRITERS / 2 {
            let wiper = store.clone();
            wipe = Some(tokio::spawn(async move { wiper.delete_all().await.unwrap() }));
        }

        let writer = store.clone();
        tasks.push(tokio::spawn(async move {
            writer.put(&numbered_mapping(i)).await.unwrap();
        }));

        let reader = store.clone();
        tasks.push(tokio::spawn(async move {
            let seen = reader.get(&format!("/k{i}")).await.unwrap();
            assert!(seen.is_none() || seen == Some(numbered_mapping(i)));
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }
    let deleted = wipe.unwrap().await.unwrap();

    let remaining = store.list().await.unwrap();
    assert_eq!(deleted + remaining.len() as u64, WRITERS as u64);
    assert_eq!(store.stats().await.unwrap().total_mappings, remaining.len() as u64);
    for mapping in remaining {
        let i: usize = mapping.key.trim_start_matches("/k").parse().unwrap();
        assert_eq!(mapping, numbered_mapping(i));
    }
}
