//! Convenience re-exports for common cache-system usage

// Core cache system components
pub use crate::backend::{CacheBackend, MemoryBackend};
pub use crate::errors::CacheError;
pub use crate::manager::CacheManager;
pub use crate::params::CacheParams;
pub use crate::redis_backend::RedisBackend;

// Re-export centralized config
pub use config::CacheConfig;
