//! Cache parameter configuration
//!
//! This module defines the CacheParams struct
//! for configuring cache behavior per store.

use crate::CacheManager;
use std::sync::Arc;
use std::time::Duration;

/// Cache parameters for configuring cache behavior per store
#[derive(Debug, Clone)]
pub struct CacheParams {
    /// The cache manager instance
    pub manager: Arc<CacheManager>,
    /// TTL for this store; falls back to the manager default when `None`
    pub ttl: Option<Duration>,
}

impl CacheParams {
    pub fn new(manager: Arc<CacheManager>) -> Self {
        Self { manager, ttl: None }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Effective TTL (store override or manager default)
    pub fn effective_ttl(&self) -> Option<Duration> {
        self.ttl.or_else(|| self.manager.default_ttl())
    }
}
