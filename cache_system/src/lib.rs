//! Cache system for constraint-keyed lookups
//!
//! This crate provides a backend-agnostic [`CacheManager`] with single-flight population
//! and namespace (tag) invalidation, plus in-memory and Redis backends.

pub mod backend;
pub mod errors;
pub mod manager;
pub mod params;
pub mod prelude;
pub mod redis_backend;

// Re-export centralized config
pub use config::CacheConfig;

pub use backend::{CacheBackend, MemoryBackend};
pub use errors::CacheError;
pub use manager::CacheManager;
pub use params::CacheParams;
pub use redis_backend::RedisBackend;
