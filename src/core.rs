//! Core ResourceHaus functionality
//!
//! This module contains the main ResourceHaus struct, which owns the database pool and the
//! shared cache and hands out configured resource stores.

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::ResourceHausError;
use cache_system::{CacheManager, CacheParams};
use config::{AppConfig, DatabaseConfig};
use store_object::{MySqlExecutor, ResourceKind, ResourceRegistry, ResourceStore, StoreError};

/// Main ResourceHaus coordinator that manages the database connection and the shared cache
pub struct ResourceHaus {
    pool: MySqlPool,
    executor: Arc<MySqlExecutor>,
    cache: Option<Arc<CacheManager>>,
    config: AppConfig,
}

impl std::fmt::Debug for ResourceHaus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceHaus")
            .field("has_cache", &self.cache.is_some())
            .field("store", &self.config.store)
            .finish()
    }
}

impl ResourceHaus {
    /// Connect to the database and set up the configured cache backend
    pub async fn new(config: AppConfig) -> Result<Self, ResourceHausError> {
        let pool = Self::connect(&config.database).await?;
        Self::from_pool(pool, config)
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: MySqlPool, config: AppConfig) -> Result<Self, ResourceHausError> {
        let cache = CacheManager::from_config(&config.cache)?.map(Arc::new);
        if cache.is_none() {
            crate::debug_log!("Resource cache disabled");
        }

        Ok(Self {
            executor: Arc::new(MySqlExecutor::new(pool.clone())),
            pool,
            cache,
            config,
        })
    }

    async fn connect(config: &DatabaseConfig) -> Result<MySqlPool, ResourceHausError> {
        let mut pool_options = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        // Set max lifetime if specified
        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }

        let pool = pool_options.connect(&config.connection_string()).await?;
        tracing::info!(
            host = %config.host,
            database = %config.database,
            "Connected to MySQL"
        );
        Ok(pool)
    }

    /// Get database pool reference
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Shared cache manager, when a cache backend is configured
    pub fn cache(&self) -> Option<&Arc<CacheManager>> {
        self.cache.as_ref()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Build a store over every resource type in `registry`
    pub fn store<R: ResourceKind>(&self, registry: ResourceRegistry<R>) -> ResourceStore<R> {
        let store = ResourceStore::new(self.executor.clone(), registry)
            .with_config(self.config.store.clone());

        match &self.cache {
            Some(manager) => store.with_cache(CacheParams::new(manager.clone())),
            None => store,
        }
    }

    /// Run `f` against a copy of `store` whose statements share one transaction.
    ///
    /// Commits when `f` succeeds and rolls back when it fails.
    pub async fn transaction<R, F, Fut, T>(
        &self,
        store: &ResourceStore<R>,
        f: F,
    ) -> Result<T, StoreError>
    where
        R: ResourceKind,
        F: FnOnce(ResourceStore<R>) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        crate::trace_log!("Starting transaction");
        self.executor
            .with_transaction(|executor| f(store.with_executor(Arc::new(executor))))
            .await
    }
}
