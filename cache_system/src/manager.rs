//! Cache manager implementation
//!
//! This module provides the main CacheManager struct: key building, JSON encoding of
//! cached values, single-flight population and namespace invalidation on top of any
//! [`CacheBackend`].

use crate::backend::{CacheBackend, MemoryBackend};
use crate::errors::CacheError;
use crate::redis_backend::RedisBackend;
use config::{CacheBackendKind, CacheConfig};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, trace};

type Flight = Arc<tokio::sync::Mutex<()>>;

/// Backend-agnostic cache manager
#[derive(Clone)]
pub struct CacheManager {
    backend: Arc<dyn CacheBackend>,
    config: Arc<CacheConfig>,
    flights: Arc<Mutex<HashMap<String, Flight>>>,
}

impl Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let in_flight = self.flights.lock().map(|f| f.len()).unwrap_or(0);
        f.debug_struct("CacheManager")
            .field("config", &self.config)
            .field("backend", &self.backend)
            .field("in_flight", &in_flight)
            .finish()
    }
}

impl CacheManager {
    /// Create a cache manager over an explicit backend
    pub fn new(backend: Arc<dyn CacheBackend>, config: CacheConfig) -> Self {
        Self {
            backend,
            config: Arc::new(config),
            flights: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// In-process cache with default settings
    pub fn in_memory(default_ttl_seconds: u64) -> Self {
        Self::new(
            Arc::new(MemoryBackend::new()),
            CacheConfig::memory(default_ttl_seconds),
        )
    }

    /// Build the manager described by configuration. `None` means caching is disabled.
    pub fn from_config(config: &CacheConfig) -> Result<Option<Self>, CacheError> {
        let backend: Arc<dyn CacheBackend> = match config.backend {
            CacheBackendKind::None => return Ok(None),
            CacheBackendKind::Memory => Arc::new(MemoryBackend::new()),
            CacheBackendKind::Redis => {
                let url = config.redis_url.as_deref().ok_or_else(|| {
                    CacheError::General("Redis backend selected without a redis_url".into())
                })?;
                Arc::new(RedisBackend::new(url)?)
            }
        };
        Ok(Some(Self::new(backend, config.clone())))
    }

    /// Generate the fully-qualified key for an entry
    fn build_key(&self, namespace: &str, key: &str) -> String {
        format!("{}:{}:{}", self.config.key_prefix, namespace, key)
    }

    /// Generate the backend tag for a namespace
    fn build_namespace(&self, namespace: &str) -> String {
        format!("{}:{}", self.config.key_prefix, namespace)
    }

    async fn lookup<T>(&self, full_key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned,
    {
        match self.backend.get(full_key).await? {
            Some(json_str) => Ok(Some(serde_json::from_str(&json_str)?)),
            None => Ok(None),
        }
    }

    fn flight_for(&self, full_key: &str) -> Result<Flight, CacheError> {
        let mut flights = self
            .flights
            .lock()
            .map_err(|_| CacheError::General("single-flight registry poisoned".into()))?;
        Ok(flights
            .entry(full_key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone())
    }

    fn release_flight(&self, full_key: &str, flight: Flight) {
        if let Ok(mut flights) = self.flights.lock() {
            // One reference held by the map and one by us means nobody else is waiting
            if Arc::strong_count(&flight) <= 2 {
                flights.remove(full_key);
            }
        }
    }

    /// Get a value from the cache, running `populate` to produce it on a miss.
    ///
    /// At most one `populate` runs per key at a time; concurrent callers for the same key
    /// wait for it and then read the freshly cached value. A failed population caches
    /// nothing and its error is returned to the caller that ran it.
    pub async fn get_or_populate<T, E, F, Fut>(
        &self,
        namespace: &str,
        key: &str,
        ttl: Option<Duration>,
        populate: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let full_key = self.build_key(namespace, key);
        if let Some(hit) = self.lookup::<T>(&full_key).await? {
            trace!(key = %full_key, "Cache hit");
            return Ok(hit);
        }

        let flight = self.flight_for(&full_key)?;
        let guard = flight.lock().await;

        // Another caller may have populated the key while we waited
        let result = match self.lookup::<T>(&full_key).await {
            Ok(Some(hit)) => Ok(hit),
            Ok(None) => {
                let populated = populate().await;
                if let Ok(value) = &populated {
                    match serde_json::to_string(value) {
                        Ok(json_str) => {
                            if let Err(e) = self
                                .backend
                                .set(&self.build_namespace(namespace), &full_key, json_str, ttl)
                                .await
                            {
                                drop(guard);
                                self.release_flight(&full_key, flight);
                                return Err(e.into());
                            }
                        }
                        Err(e) => {
                            drop(guard);
                            self.release_flight(&full_key, flight);
                            return Err(CacheError::from(e).into());
                        }
                    }
                }
                populated
            }
            Err(e) => Err(e.into()),
        };

        drop(guard);
        self.release_flight(&full_key, flight);
        result
    }

    /// Remove a single cached entry
    pub async fn invalidate(&self, namespace: &str, key: &str) -> Result<bool, CacheError> {
        self.backend.delete(&self.build_key(namespace, key)).await
    }

    /// Remove every cached entry in a namespace
    pub async fn invalidate_namespace(&self, namespace: &str) -> Result<u64, CacheError> {
        let removed = self
            .backend
            .delete_namespace(&self.build_namespace(namespace))
            .await?;
        debug!(namespace, removed, "Invalidated cache namespace");
        Ok(removed)
    }

    /// Default TTL from configuration
    pub fn default_ttl(&self) -> Option<Duration> {
        self.config.ttl_duration()
    }

    /// Get current configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}
