//! Type definitions for signal system
//!
//! Callback and publisher seams shared by the signal manager and the store.

use crate::event::DomainEvent;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Async event callback type that returns a Result
pub type EventCallback =
    Arc<dyn Fn(DomainEvent) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Fire-and-forget publication of domain events
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, event: DomainEvent) -> anyhow::Result<()>;
}

/// Event processing error
#[derive(Debug)]
pub struct EventProcessingError {
    pub callback_index: usize,
    pub error: anyhow::Error,
}

impl std::fmt::Display for EventProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "callback {} failed: {}", self.callback_index, self.error)
    }
}

impl std::error::Error for EventProcessingError {}
