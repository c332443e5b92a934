//! Redis cache backend
//!
//! Values are stored as plain string keys. Each namespace is a Redis set holding the keys
//! written under it, so namespace invalidation never needs a `KEYS`/`SCAN` pass.

use crate::backend::CacheBackend;
use crate::errors::CacheError;
use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Redis-based cache backend
#[derive(Clone)]
pub struct RedisBackend {
    client: Arc<Client>,
    connection_pool: Arc<RwLock<Option<redis::aio::MultiplexedConnection>>>,
}

impl Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let connection_status = {
            match self.connection_pool.try_read() {
                Ok(pool) => {
                    if pool.is_some() {
                        "connected"
                    } else {
                        "no_connection"
                    }
                }
                Err(_) => "lock_error",
            }
        };

        f.debug_struct("RedisBackend")
            .field("connected", &connection_status)
            .finish()
    }
}

impl RedisBackend {
    /// Create a new backend; the connection is opened lazily on first use
    pub fn new(redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;

        Ok(Self {
            client: Arc::new(client),
            connection_pool: Arc::new(RwLock::new(None)),
        })
    }

    /// Get or create Redis connection
    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, CacheError> {
        let mut pool = self.connection_pool.write().await;

        if pool.is_none() {
            let connection = self.client.get_multiplexed_async_connection().await?;
            *pool = Some(connection);
        }

        Ok(pool
            .as_ref()
            .ok_or_else(|| CacheError::Connection("Failed to get connection from pool".into()))?
            .clone())
    }

    /// Key of the set tracking a namespace's members
    fn namespace_key(namespace: &str) -> String {
        format!("{}:__keys__", namespace)
    }

    /// Ping Redis to check connectivity
    pub async fn ping(&self) -> Result<String, CacheError> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong)
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.get_connection().await?;
        let cached: Option<String> = conn.get(key).await?;
        Ok(cached)
    }

    async fn set(
        &self,
        namespace: &str,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let mut conn = self.get_connection().await?;
        let mut pipe = redis::pipe();
        pipe.atomic();
        match ttl {
            Some(ttl) => {
                pipe.set_ex(key, value, ttl.as_secs().max(1)).ignore();
            }
            None => {
                pipe.set(key, value).ignore();
            }
        }
        pipe.sadd(Self::namespace_key(namespace), key).ignore();
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.get_connection().await?;
        let deleted: i64 = conn.del(key).await?;
        Ok(deleted > 0)
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<u64, CacheError> {
        let set_key = Self::namespace_key(namespace);
        let mut conn = self.get_connection().await?;

        // Read and drop the member set in one MULTI/EXEC so a concurrent `set` lands either in
        // this snapshot or in a fresh set that the next invalidation will see
        let (keys,): (Vec<String>,) = redis::pipe()
            .atomic()
            .smembers(&set_key)
            .del(&set_key)
            .ignore()
            .query_async(&mut conn)
            .await?;
        if keys.is_empty() {
            return Ok(0);
        }

        // Members may have expired on their own; DEL only counts the ones still present
        let deleted: u64 = conn.del(&keys).await?;
        Ok(deleted)
    }
}
