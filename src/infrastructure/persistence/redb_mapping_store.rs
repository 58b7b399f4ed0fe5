//! Embedded mapping store backed by a redb database file.

use super::codec;
use crate::domain::entities::Mapping;
use crate::domain::repositories::{MappingStore, StoreError, StoreStats};
use async_trait::async_trait;
use redb::{Database, DatabaseError, ReadableTable, TableDefinition};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const MAPPINGS: TableDefinition<&str, &[u8]> = TableDefinition::new("mappings");

const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(100);

fn backend(e: impl Into<redb::Error>) -> StoreError {
    StoreError::Backend(e.into().to_string())
}

/// redb implementation of [`MappingStore`].
///
/// Every operation runs one redb transaction on the blocking thread pool.
pub struct RedbMappingStore {
    db: RwLock<Option<Arc<Database>>>,
    path: PathBuf,
}

impl RedbMappingStore {
    /// Opens (or creates) the database file and its `mappings` table.
    ///
    /// A file held by another process is retried until `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the file stays locked or
    /// cannot be opened.
    pub async fn open(path: impl AsRef<Path>, timeout: Duration) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let deadline = Instant::now() + timeout;

        let db = loop {
            let attempt = path.clone();
            let result = tokio::task::spawn_blocking(move || Database::create(attempt))
                .await
                .map_err(|e| StoreError::Unavailable(format!("open task failed: {e}")))?;

            match result {
                Ok(db) => break Arc::new(db),
                Err(DatabaseError::DatabaseAlreadyOpen) if Instant::now() < deadline => {
                    debug!("Database {} is locked, retrying", path.display());
                    tokio::time::sleep(LOCK_RETRY_INTERVAL).await;
                }
                Err(e) => {
                    return Err(StoreError::Unavailable(format!(
                        "failed to open {}: {}",
                        path.display(),
                        e
                    )));
                }
            }
        };

        let init = db.clone();
        tokio::task::spawn_blocking(move || -> Result<(), redb::Error> {
            let txn = init.begin_write()?;
            txn.open_table(MAPPINGS)?;
            txn.commit()?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Unavailable(format!("init task failed: {e}")))?
        .map_err(|e| StoreError::Unavailable(format!("failed to initialize tables: {e}")))?;

        info!("✓ Opened redb database at {}", path.display());

        Ok(Self {
            db: RwLock::new(Some(db)),
            path,
        })
    }

    fn database(&self) -> Result<Arc<Database>, StoreError> {
        self.db
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(StoreError::Closed)
    }

    async fn run<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
    {
        let db = self.database()?;
        tokio::task::spawn_blocking(move || op(&db))
            .await
            .map_err(|e| StoreError::Backend(format!("blocking task failed: {e}")))?
    }
}

#[async_trait]
impl MappingStore for RedbMappingStore {
    async fn get(&self, key: &str) -> Result<Option<Mapping>, StoreError> {
        let key = key.to_string();
        self.run(move |db| {
            let txn = db.begin_read().map_err(backend)?;
            let table = txn.open_table(MAPPINGS).map_err(backend)?;
            let value = table.get(key.as_str()).map_err(backend)?;
            let mapping = match value {
                Some(bytes) => codec::decode(&key, bytes.value())?,
                None => None,
            };
            Ok(mapping)
        })
        .await
    }

    async fn put(&self, mapping: &Mapping) -> Result<(), StoreError> {
        let key = mapping.key.clone();
        let bytes = codec::encode(mapping)?;
        self.run(move |db| {
            let txn = db.begin_write().map_err(backend)?;
            {
                let mut table = txn.open_table(MAPPINGS).map_err(backend)?;
                table
                    .insert(key.as_str(), bytes.as_slice())
                    .map_err(backend)?;
            }
            txn.commit().map_err(backend)?;
            debug!("Stored mapping {}", key);
            Ok(())
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let key = key.to_string();
        self.run(move |db| {
            let txn = db.begin_write().map_err(backend)?;
            let existed = {
                let mut table = txn.open_table(MAPPINGS).map_err(backend)?;
                table
                    .remove(key.as_str())
                    .map_err(backend)?
                    .is_some_and(|removed| codec::is_listed(&key, removed.value()))
            };
            txn.commit().map_err(backend)?;
            Ok(existed)
        })
        .await
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        self.run(|db| {
            let txn = db.begin_write().map_err(backend)?;
            let count = {
                let mut table = txn.open_table(MAPPINGS).map_err(backend)?;
                let mut keys = Vec::new();
                let mut listed = 0;
                for entry in table.iter().map_err(backend)? {
                    let (key, value) = entry.map_err(backend)?;
                    if codec::is_listed(key.value(), value.value()) {
                        listed += 1;
                    }
                    keys.push(key.value().to_string());
                }

                for key in &keys {
                    table.remove(key.as_str()).map_err(backend)?;
                }
                listed
            };
            txn.commit().map_err(backend)?;
            Ok(count)
        })
        .await
    }

    async fn list(&self) -> Result<Vec<Mapping>, StoreError> {
        self.run(|db| {
            let txn = db.begin_read().map_err(backend)?;
            let table = txn.open_table(MAPPINGS).map_err(backend)?;

            let mut mappings = Vec::new();
            for entry in table.iter().map_err(backend)? {
                let (key, value) = entry.map_err(backend)?;
                match codec::decode(key.value(), value.value()) {
                    Ok(Some(mapping)) => mappings.push(mapping),
                    Ok(None) => {}
                    Err(e) => warn!("Skipping unreadable record: {}", e),
                }
            }
            Ok(mappings)
        })
        .await
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let path = self.path.clone();
        self.run(move |db| {
            let txn = db.begin_read().map_err(backend)?;
            let table = txn.open_table(MAPPINGS).map_err(backend)?;
            let mut total_mappings = 0;
            for entry in table.iter().map_err(backend)? {
                let (key, value) = entry.map_err(backend)?;
                if codec::is_listed(key.value(), value.value()) {
                    total_mappings += 1;
                }
            }
            let disk_usage = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

            Ok(StoreStats {
                total_mappings,
                disk_usage,
            })
        })
        .await
    }

    async fn close(&self) -> Result<(), StoreError> {
        let db = self
            .db
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if db.is_some() {
            info!("Closed redb database at {}", self.path.display());
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redb"
    }
}
