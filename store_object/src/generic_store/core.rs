use crate::errors::StoreError;
use crate::query_builder::RenderedQuery;
use crate::registry::{ResourceEntry, ResourceRegistry};
use crate::traits::{DefaultStrategy, QueryStrategy, ResourceKind, SqlExecutor};
use cache_system::CacheParams;
use config::StoreConfig;
use signal_system::{AuditClient, DomainEvent, Publisher};
use std::sync::Arc;
use type_mapping::Record;

/// Resource access facade over every resource type of `R`.
///
/// Configuration is fixed at construction; the builder methods consume the store.
#[derive(Clone)]
pub struct ResourceStore<R: ResourceKind> {
    pub(crate) executor: Arc<dyn SqlExecutor>,
    pub(crate) registry: Arc<ResourceRegistry<R>>,
    pub(crate) strategy: Arc<dyn QueryStrategy<R>>,
    pub(crate) cache: Option<CacheParams>,
    pub(crate) audit: Option<Arc<dyn AuditClient>>,
    pub(crate) publisher: Option<Arc<dyn Publisher>>,
    pub(crate) config: StoreConfig,
}

impl<R: ResourceKind> std::fmt::Debug for ResourceStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceStore")
            .field("resource_types", &R::all().len())
            .field("has_cache", &self.has_cache())
            .field("has_audit", &self.audit.is_some())
            .field("has_publisher", &self.publisher.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl<R: ResourceKind> ResourceStore<R> {
    pub fn new(executor: Arc<dyn SqlExecutor>, registry: ResourceRegistry<R>) -> Self {
        Self {
            executor,
            registry: Arc::new(registry),
            strategy: Arc::new(DefaultStrategy),
            cache: None,
            audit: None,
            publisher: None,
            config: StoreConfig::default(),
        }
    }

    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_strategy(mut self, strategy: Arc<dyn QueryStrategy<R>>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_cache(mut self, cache: CacheParams) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_audit(mut self, audit: Arc<dyn AuditClient>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Same configuration over a different executor, e.g. a transaction-scoped one
    pub fn with_executor(&self, executor: Arc<dyn SqlExecutor>) -> Self {
        Self {
            executor,
            ..self.clone()
        }
    }

    /// Check if a cache is configured
    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn registry(&self) -> &ResourceRegistry<R> {
        &self.registry
    }

    pub(crate) fn entry(&self, kind: R) -> &ResourceEntry {
        self.registry.entry(kind)
    }

    pub(crate) async fn run(&self, query: &RenderedQuery) -> Result<Vec<Record>, StoreError> {
        tracing::debug!(query = %query.text, params = ?query.params, "Final query");
        self.executor
            .execute(&query.text, query.params.as_deref())
            .await
    }

    /// Drop every cached lookup of `kind`
    pub(crate) async fn invalidate_cache(&self, kind: R) -> Result<(), StoreError> {
        if let Some(cache) = &self.cache {
            cache.manager.invalidate_namespace(kind.tag()).await?;
        }
        Ok(())
    }

    /// Hand `event` to the publisher, if one is attached
    pub(crate) async fn publish(&self, event: DomainEvent) -> Result<(), StoreError> {
        match &self.publisher {
            Some(publisher) => publisher.publish(event).await.map_err(StoreError::Publish),
            None => Ok(()),
        }
    }

    pub(crate) fn present(&self, kind: R, record: Record) -> Record {
        if self.config.convert_binary_ids {
            crate::id_type::buffers_to_hex(record, &self.entry(kind).hex)
        } else {
            record
        }
    }
}
