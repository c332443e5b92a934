use crate::event::DomainEvent;
use crate::types::{EventCallback, EventProcessingError, Publisher};
use async_trait::async_trait;
use futures::future::join_all;
use futures::FutureExt;
use std::future::Future;
use std::sync::{Arc, RwLockReadGuard, RwLockWriteGuard};

/// In-process publisher fanning domain events out to async callbacks
pub struct SignalManager {
    callbacks: std::sync::RwLock<Vec<EventCallback>>,
}

impl std::fmt::Debug for SignalManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalManager")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}

impl SignalManager {
    pub fn new() -> Self {
        Self {
            callbacks: std::sync::RwLock::new(Vec::new()),
        }
    }

    // The registry is only pushed to or cleared under the lock, so a poisoned guard still
    // holds a usable list
    fn read_callbacks(&self) -> RwLockReadGuard<'_, Vec<EventCallback>> {
        self.callbacks.read().unwrap_or_else(|poisoned| {
            tracing::warn!("Signal callback registry was poisoned; recovering");
            poisoned.into_inner()
        })
    }

    fn write_callbacks(&self) -> RwLockWriteGuard<'_, Vec<EventCallback>> {
        self.callbacks.write().unwrap_or_else(|poisoned| {
            tracing::warn!("Signal callback registry was poisoned; recovering");
            poisoned.into_inner()
        })
    }

    /// Add event callback
    pub fn add_callback<F, Fut>(&self, callback: F)
    where
        F: Fn(DomainEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let callback: EventCallback = Arc::new(move |event| callback(event).boxed());
        self.write_callbacks().push(callback);
    }

    /// Emit event to all subscribers concurrently, collecting every failure
    pub async fn emit(&self, event: DomainEvent) -> Vec<EventProcessingError> {
        let callbacks: Vec<EventCallback> = self.read_callbacks().clone();

        let results = join_all(callbacks.iter().map(|callback| callback(event.clone()))).await;

        results
            .into_iter()
            .enumerate()
            .filter_map(|(callback_index, result)| {
                result.err().map(|error| EventProcessingError {
                    callback_index,
                    error,
                })
            })
            .collect()
    }

    /// Clear all callbacks
    pub fn clear_callbacks(&self) {
        self.write_callbacks().clear();
    }

    /// Get number of registered callbacks
    pub fn callback_count(&self) -> usize {
        self.read_callbacks().len()
    }
}

impl Default for SignalManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Publisher for SignalManager {
    async fn publish(&self, event: DomainEvent) -> anyhow::Result<()> {
        let action = event.action;
        let mut errors = self.emit(event).await;
        match errors.len() {
            0 => Ok(()),
            1 => Err(anyhow::Error::new(errors.remove(0))),
            n => Err(anyhow::anyhow!(
                "{} of {} callbacks failed for '{}' event; first: {}",
                n,
                self.callback_count(),
                action.as_str(),
                errors[0]
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventAction;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use type_mapping::Record;

    #[tokio::test]
    async fn test_publish_reaches_every_callback() {
        let manager = SignalManager::new();
        let seen = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let seen = seen.clone();
            manager.add_callback(move |event| {
                let seen = seen.clone();
                async move {
                    assert_eq!(event.resource_type, "users");
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), anyhow::Error>(())
                }
            });
        }

        let event = DomainEvent::new(EventAction::Created, "users", Record::new());
        manager.publish(event).await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert_eq!(manager.callback_count(), 2);
    }

    #[tokio::test]
    async fn test_failing_callback_does_not_stop_others() {
        let manager = SignalManager::new();
        let seen = Arc::new(AtomicUsize::new(0));

        manager.add_callback(|_| async { Err::<(), _>(anyhow::anyhow!("broker down")) });
        let counter = seen.clone();
        manager.add_callback(move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), anyhow::Error>(())
            }
        });

        let event = DomainEvent::new(EventAction::Deleted, "pets", Record::new());
        let result = manager.publish(event).await;

        assert!(result.is_err());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_callbacks_survive_a_poisoned_registry() {
        let manager = Arc::new(SignalManager::new());
        let seen = Arc::new(AtomicUsize::new(0));

        let poisoner = manager.clone();
        let panicked = std::thread::spawn(move || {
            let _guard = poisoner.callbacks.write().unwrap();
            panic!("poison the registry");
        })
        .join();
        assert!(panicked.is_err());
        assert!(manager.callbacks.is_poisoned());

        let counter = seen.clone();
        manager.add_callback(move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), anyhow::Error>(())
            }
        });
        assert_eq!(manager.callback_count(), 1);

        let event = DomainEvent::new(EventAction::Created, "users", Record::new());
        assert!(manager.publish(event).await.is_ok());
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clear_callbacks() {
        let manager = SignalManager::default();
        manager.add_callback(|_| async { Ok::<(), anyhow::Error>(()) });
        manager.clear_callbacks();
        assert_eq!(manager.callback_count(), 0);
        let event = DomainEvent::new(EventAction::Updated, "users", Record::new());
        assert!(manager.publish(event).await.is_ok());
    }
}
