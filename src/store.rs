//! Pooled key-value store facade
//!
//! Every operation borrows one connection from the shared pool, issues a
//! single command against a namespaced key, and returns the connection.
//! Anything beyond key prefixing and value (de)serialization — framing,
//! multiplexing, reconnects — is the driver's job.

use std::collections::HashMap;
use std::time::Duration;

use deadpool_redis::{Pool, Runtime};
use redis::AsyncCommands;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::codec::{JsonCodec, ValueCodec};
use crate::config::RedisConfig;
use crate::error::KvResult;

/// Prefix prepended to every logical key on the wire.
///
/// This is a compatibility requirement: external tools inspecting the
/// database directly must account for it, and it is what keeps this
/// facade's keyspace apart from other applications sharing the database.
pub const KEY_PREFIX: &str = "mr-";

fn prefixed(key: &str) -> String {
    format!("{}{}", KEY_PREFIX, key)
}

fn build_pool(config: &RedisConfig) -> KvResult<Pool> {
    config.validate()?;
    let mut pool_config = deadpool_redis::Config::from_url(config.url());
    pool_config.pool = Some(deadpool_redis::PoolConfig::new(config.max_size));
    let pool = pool_config.create_pool(Some(Runtime::Tokio1))?;
    debug!(
        host = %config.host,
        port = config.port,
        db = config.db,
        max_size = config.max_size,
        "created redis connection pool"
    );
    Ok(pool)
}

/// Key-value facade over a shared Redis connection pool.
///
/// Stored values are encoded by the injected [`ValueCodec`] (JSON by
/// default) and every key is namespaced with [`KEY_PREFIX`]. The pool is
/// created lazily on first use and shared by all operations.
///
/// Failures propagate unchanged from the driver; there is no retry or
/// fallback at this layer.
pub struct KvStore<C: ValueCodec = JsonCodec> {
    config: RedisConfig,
    codec: C,
    pool: OnceCell<Pool>,
}

impl KvStore<JsonCodec> {
    /// Create a store with the default JSON codec
    pub fn new(config: RedisConfig) -> Self {
        Self::with_codec(config, JsonCodec)
    }
}

impl<C: ValueCodec> KvStore<C> {
    /// Create a store with a custom value codec
    pub fn with_codec(config: RedisConfig, codec: C) -> Self {
        Self {
            config,
            codec,
            pool: OnceCell::new(),
        }
    }

    /// Connection parameters this store was built with
    pub fn config(&self) -> &RedisConfig {
        &self.config
    }

    /// Shared connection pool, created on first call.
    ///
    /// Concurrent first callers are serialized on the creation guard, so
    /// exactly one pool is ever built through this path.
    pub async fn pool(&self) -> KvResult<Pool> {
        let pool = self
            .pool
            .get_or_try_init(|| async { build_pool(&self.config) })
            .await?;
        Ok(pool.clone())
    }

    /// Build a fresh pool unconditionally.
    ///
    /// The new pool becomes the shared pool only when none exists yet;
    /// otherwise the existing shared pool keeps serving other callers and
    /// the returned handle is private to the caller.
    pub async fn create_pool(&self) -> KvResult<Pool> {
        let pool = build_pool(&self.config)?;
        let _ = self.pool.set(pool.clone());
        Ok(pool)
    }

    async fn connection(&self) -> KvResult<deadpool_redis::Connection> {
        let pool = self.pool().await?;
        Ok(pool.get().await?)
    }

    /// Store a value under `key` with no expiry
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> KvResult<()> {
        let bytes = self.codec.encode(value)?;
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(prefixed(key), bytes).await?;
        Ok(())
    }

    /// Store a value under `key`, expiring after `ttl`.
    ///
    /// The expiry is set atomically with the write (SETEX).
    pub async fn set_with_ttl<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> KvResult<()> {
        let bytes = self.codec.encode(value)?;
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(prefixed(key), bytes, ttl.as_secs())
            .await?;
        Ok(())
    }

    /// Store several pairs in one atomic MSET
    pub async fn set_multi<T: Serialize>(&self, pairs: &[(&str, T)]) -> KvResult<()> {
        if pairs.is_empty() {
            return Ok(());
        }
        let mut cmd = redis::cmd("MSET");
        for (key, value) in pairs {
            cmd.arg(prefixed(key)).arg(self.codec.encode(value)?);
        }
        let mut conn = self.connection().await?;
        cmd.query_async::<()>(&mut *conn).await?;
        Ok(())
    }

    /// Store several expiring pairs, one SETEX per pair.
    ///
    /// Not atomic as a batch: the writes run sequentially on one held
    /// connection, and a failure mid-sequence leaves earlier pairs
    /// applied.
    pub async fn set_multi_with_ttl<T: Serialize>(
        &self,
        pairs: &[(&str, T)],
        ttl: Duration,
    ) -> KvResult<()> {
        let mut conn = self.connection().await?;
        for (key, value) in pairs {
            let bytes = self.codec.encode(value)?;
            conn.set_ex::<_, _, ()>(prefixed(key), bytes, ttl.as_secs())
                .await?;
        }
        Ok(())
    }

    /// Fetch and decode the value under `key`, `None` when absent
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> KvResult<Option<T>> {
        let mut conn = self.connection().await?;
        let raw: Option<Vec<u8>> = conn.get(prefixed(key)).await?;
        match raw {
            Some(bytes) => Ok(Some(self.codec.decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Fetch several keys in one MGET.
    ///
    /// The result maps every requested key to its decoded value, or to
    /// `None` when the key is absent.
    pub async fn get_multi<T: DeserializeOwned>(
        &self,
        keys: &[&str],
    ) -> KvResult<HashMap<String, Option<T>>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        let mut cmd = redis::cmd("MGET");
        for key in keys {
            cmd.arg(prefixed(key));
        }
        let mut conn = self.connection().await?;
        let raw: Vec<Option<Vec<u8>>> = cmd.query_async(&mut *conn).await?;

        let mut result = HashMap::with_capacity(keys.len());
        for (key, bytes) in keys.iter().zip(raw) {
            let value = match bytes {
                Some(bytes) => Some(self.codec.decode(&bytes)?),
                None => None,
            };
            result.insert((*key).to_string(), value);
        }
        Ok(result)
    }

    /// Append a value to the tail of the list at `key`
    pub async fn rpush<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> KvResult<()> {
        let bytes = self.codec.encode(value)?;
        let mut conn = self.connection().await?;
        conn.rpush::<_, _, ()>(prefixed(key), bytes).await?;
        Ok(())
    }

    /// Prepend a value to the head of the list at `key`
    pub async fn lpush<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> KvResult<()> {
        let bytes = self.codec.encode(value)?;
        let mut conn = self.connection().await?;
        conn.lpush::<_, _, ()>(prefixed(key), bytes).await?;
        Ok(())
    }

    /// Remove and return the tail of the list, `None` when empty
    pub async fn rpop<T: DeserializeOwned>(&self, key: &str) -> KvResult<Option<T>> {
        let mut conn = self.connection().await?;
        let raw: Option<Vec<u8>> = conn.rpop(prefixed(key), None).await?;
        match raw {
            Some(bytes) => Ok(Some(self.codec.decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Remove and return the head of the list, `None` when empty
    pub async fn lpop<T: DeserializeOwned>(&self, key: &str) -> KvResult<Option<T>> {
        let mut conn = self.connection().await?;
        let raw: Option<Vec<u8>> = conn.lpop(prefixed(key), None).await?;
        match raw {
            Some(bytes) => Ok(Some(self.codec.decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Decoded list slice between `start` and `stop`, inclusive.
    ///
    /// Indices follow Redis semantics: 0-based, negative values count
    /// from the tail.
    pub async fn lrange<T: DeserializeOwned>(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> KvResult<Vec<T>> {
        let mut conn = self.connection().await?;
        let raw: Vec<Vec<u8>> = conn.lrange(prefixed(key), start, stop).await?;
        raw.iter().map(|bytes| self.codec.decode(bytes)).collect()
    }

    /// Decoded element at `index`, `None` when out of range
    pub async fn lindex<T: DeserializeOwned>(&self, key: &str, index: isize) -> KvResult<Option<T>> {
        let mut conn = self.connection().await?;
        let raw: Option<Vec<u8>> = conn.lindex(prefixed(key), index).await?;
        match raw {
            Some(bytes) => Ok(Some(self.codec.decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Length of the list at `key`, 0 when the key is absent
    pub async fn llen(&self, key: &str) -> KvResult<u64> {
        let mut conn = self.connection().await?;
        Ok(conn.llen(prefixed(key)).await?)
    }

    /// Truncate the list at `key` to the `start..=stop` index range
    pub async fn ltrim(&self, key: &str, start: isize, stop: isize) -> KvResult<()> {
        let mut conn = self.connection().await?;
        conn.ltrim::<_, ()>(prefixed(key), start, stop).await?;
        Ok(())
    }

    /// Remove `key`; succeeds whether or not the key exists
    pub async fn delete(&self, key: &str) -> KvResult<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(prefixed(key)).await?;
        Ok(())
    }

    /// Remove several keys in one DEL
    pub async fn delete_multi(&self, keys: &[&str]) -> KvResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let namespaced: Vec<String> = keys.iter().map(|key| prefixed(key)).collect();
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(namespaced).await?;
        Ok(())
    }

    /// Clear the entire logical database (FLUSHDB ASYNC).
    ///
    /// Irreversible, and removes every key in the database, namespaced
    /// or not.
    pub async fn flush_db(&self) -> KvResult<()> {
        warn!(db = self.config.db, "flushing entire redis database");
        let mut conn = self.connection().await?;
        redis::cmd("FLUSHDB")
            .arg("ASYNC")
            .query_async::<()>(&mut *conn)
            .await?;
        Ok(())
    }

    /// Number of keys in the logical database
    pub async fn db_size(&self) -> KvResult<i64> {
        let mut conn = self.connection().await?;
        Ok(redis::cmd("DBSIZE").query_async(&mut *conn).await?)
    }

    /// Server INFO output as text
    pub async fn db_info(&self) -> KvResult<String> {
        let mut conn = self.connection().await?;
        Ok(redis::cmd("INFO").query_async(&mut *conn).await?)
    }

    /// Unix timestamp of the last successful save to disk
    pub async fn last_save_time(&self) -> KvResult<i64> {
        let mut conn = self.connection().await?;
        Ok(redis::cmd("LASTSAVE").query_async(&mut *conn).await?)
    }

    /// Start a background save to disk (BGSAVE)
    pub async fn save_db(&self) -> KvResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("BGSAVE").query_async::<()>(&mut *conn).await?;
        Ok(())
    }

    /// Atomically add 1 to the counter at `key`, returning the new value.
    ///
    /// Fails with a driver type error when the stored value is not
    /// integer-formatted.
    pub async fn increment(&self, key: &str) -> KvResult<i64> {
        let mut conn = self.connection().await?;
        Ok(redis::cmd("INCR")
            .arg(prefixed(key))
            .query_async(&mut *conn)
            .await?)
    }

    /// Atomically add `amount` to the counter at `key`
    pub async fn increment_by(&self, key: &str, amount: i64) -> KvResult<i64> {
        let mut conn = self.connection().await?;
        Ok(redis::cmd("INCRBY")
            .arg(prefixed(key))
            .arg(amount)
            .query_async(&mut *conn)
            .await?)
    }

    /// Atomically subtract 1 from the counter at `key`
    pub async fn decrement(&self, key: &str) -> KvResult<i64> {
        let mut conn = self.connection().await?;
        Ok(redis::cmd("DECR")
            .arg(prefixed(key))
            .query_async(&mut *conn)
            .await?)
    }

    /// Atomically subtract `amount` from the counter at `key`
    pub async fn decrement_by(&self, key: &str, amount: i64) -> KvResult<i64> {
        let mut conn = self.connection().await?;
        Ok(redis::cmd("DECRBY")
            .arg(prefixed(key))
            .arg(amount)
            .query_async(&mut *conn)
            .await?)
    }

    /// Verify connectivity by writing and deleting a throwaway probe key.
    ///
    /// Any error the write or delete raises propagates to the caller.
    pub async fn test_con(&self) -> KvResult<()> {
        let key = format!("connection-test-{}", Uuid::new_v4().simple());
        self.set(&key, &0).await?;
        self.delete(&key).await?;
        debug!(host = %self.config.host, port = self.config.port, "connectivity probe succeeded");
        Ok(())
    }
}
