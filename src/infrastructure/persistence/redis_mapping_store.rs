//! Remote mapping store backed by Redis.
//!
//! Mappings live under `mapping::{key}`. Bulk operations run as Lua scripts so
//! each executes atomically on the server.

use super::codec;
use crate::config::mask_connection_string;
use crate::domain::entities::Mapping;
use crate::domain::repositories::{MappingStore, StoreError, StoreStats};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, RedisError, Script, aio::ConnectionManager};
use std::sync::{LazyLock, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

const KEY_PREFIX: &str = "mapping::";

static DELETE: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
local value = redis.call('GET', KEYS[1])
redis.call('DEL', KEYS[1])
return value
",
    )
});

// Both bulk scripts answer with flat key/value pairs of the non-empty values
// they saw. DEL and MGET are chunked to stay below Lua's unpack() limit.
static DELETE_ALL: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
local keys = redis.call('KEYS', ARGV[1] .. '*')
local result = {}
for i = 1, #keys, 500 do
    local last = math.min(i + 499, #keys)
    local values = redis.call('MGET', unpack(keys, i, last))
    for j = 1, last - i + 1 do
        if values[j] and values[j] ~= '' then
            result[#result + 1] = keys[i + j - 1]
            result[#result + 1] = values[j]
        end
    end
    redis.call('DEL', unpack(keys, i, last))
end
return result
",
    )
});

static LIST: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
local keys = redis.call('KEYS', ARGV[1] .. '*')
local result = {}
for i = 1, #keys, 500 do
    local last = math.min(i + 499, #keys)
    local values = redis.call('MGET', unpack(keys, i, last))
    for j = 1, last - i + 1 do
        if values[j] and values[j] ~= '' then
            result[#result + 1] = keys[i + j - 1]
            result[#result + 1] = values[j]
        end
    end
end
return result
",
    )
});

fn backend(e: RedisError) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Redis implementation of [`MappingStore`].
///
/// Uses a `ConnectionManager`, which reconnects transparently and is cheap to
/// clone per call.
pub struct RedisMappingStore {
    conn: RwLock<Option<ConnectionManager>>,
}

impl RedisMappingStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// Both steps together are bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the URL is invalid, the server
    /// is unreachable, or the timeout elapses.
    pub async fn connect(redis_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        info!("Connecting to Redis at {}", mask_connection_string(redis_url));

        let client = Client::open(redis_url)
            .map_err(|e| StoreError::Unavailable(format!("Failed to create Redis client: {e}")))?;

        let manager = tokio::time::timeout(timeout, async {
            let mut manager = ConnectionManager::new(client).await?;
            manager.ping::<()>().await?;
            Ok::<_, RedisError>(manager)
        })
        .await
        .map_err(|_| {
            StoreError::Unavailable(format!("Redis did not answer within {timeout:?}"))
        })?
        .map_err(|e| StoreError::Unavailable(format!("Failed to connect to Redis: {e}")))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            conn: RwLock::new(Some(manager)),
        })
    }

    fn connection(&self) -> Result<ConnectionManager, StoreError> {
        self.conn
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(StoreError::Closed)
    }

    fn build_key(key: &str) -> String {
        format!("{KEY_PREFIX}{key}")
    }
}

#[async_trait]
impl MappingStore for RedisMappingStore {
    async fn get(&self, key: &str) -> Result<Option<Mapping>, StoreError> {
        let mut conn = self.connection()?;
        let payload: Option<Vec<u8>> = conn.get(Self::build_key(key)).await.map_err(backend)?;

        match payload {
            Some(bytes) => codec::decode(key, &bytes),
            None => Ok(None),
        }
    }

    async fn put(&self, mapping: &Mapping) -> Result<(), StoreError> {
        let bytes = codec::encode(mapping)?;
        let mut conn = self.connection()?;
        conn.set::<_, _, ()>(Self::build_key(&mapping.key), bytes)
            .await
            .map_err(backend)?;

        debug!("Stored mapping {}", mapping.key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection()?;
        let removed: Option<Vec<u8>> = DELETE
            .key(Self::build_key(key))
            .invoke_async(&mut conn)
            .await
            .map_err(backend)?;

        Ok(removed.is_some_and(|bytes| codec::is_listed(key, &bytes)))
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut conn = self.connection()?;
        let flat: Vec<Vec<u8>> = DELETE_ALL
            .arg(KEY_PREFIX)
            .invoke_async(&mut conn)
            .await
            .map_err(backend)?;

        Ok(decode_pairs(&flat).len() as u64)
    }

    async fn list(&self) -> Result<Vec<Mapping>, StoreError> {
        let mut conn = self.connection()?;
        let flat: Vec<Vec<u8>> = LIST
            .arg(KEY_PREFIX)
            .invoke_async(&mut conn)
            .await
            .map_err(backend)?;

        Ok(decode_pairs(&flat))
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let mut conn = self.connection()?;
        let flat: Vec<Vec<u8>> = LIST
            .arg(KEY_PREFIX)
            .invoke_async(&mut conn)
            .await
            .map_err(backend)?;
        let total_mappings = decode_pairs(&flat).len() as u64;

        let info: String = redis::cmd("INFO")
            .arg("memory")
            .query_async(&mut conn)
            .await
            .map_err(backend)?;

        Ok(StoreStats {
            total_mappings,
            disk_usage: parse_used_memory(&info).unwrap_or(0),
        })
    }

    async fn close(&self) -> Result<(), StoreError> {
        let conn = self
            .conn
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if conn.is_some() {
            info!("Closed Redis connection");
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

/// Decodes the flat `key, value, key, value, ...` reply of the bulk scripts,
/// skipping records that do not decode.
fn decode_pairs(flat: &[Vec<u8>]) -> Vec<Mapping> {
    let mut mappings = Vec::with_capacity(flat.len() / 2);
    for pair in flat.chunks_exact(2) {
        let redis_key = String::from_utf8_lossy(&pair[0]);
        let key = redis_key.strip_prefix(KEY_PREFIX).unwrap_or(&*redis_key);

        match codec::decode(key, &pair[1]) {
            Ok(Some(mapping)) => mappings.push(mapping),
            Ok(None) => {}
            Err(e) => warn!("Skipping unreadable record: {}", e),
        }
    }
    mappings
}

/// Extracts `used_memory` from an `INFO memory` reply.
fn parse_used_memory(info: &str) -> Option<u64> {
    info.lines()
        .find_map(|line| line.strip_prefix("used_memory:"))
        .and_then(|value| value.trim().parse().ok())
}
