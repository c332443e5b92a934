//! Convenience re-exports for common ResourceHaus usage
//!
//! This prelude module re-exports the most commonly used items from the ResourceHaus ecosystem,
//! making it easier to import everything you need with a single use statement.
//!
//! # Example
//!
//! ```rust
//! use resourcehaus::prelude::*;
//!
//! // Now you have access to all the common ResourceHaus types and traits
//! ```

// Core ResourceHaus components
pub use crate::core::ResourceHaus;
pub use crate::errors::ResourceHausError;

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, DatabaseConfig, StoreConfig};

// Re-export commonly used store-object types for convenience
pub use store_object::prelude::*;

// Re-export store_object module for macro-generated code
pub use store_object;

// Re-export signal system for audit and events
pub use signal_system::prelude::*;

// Re-export cache system
pub use cache_system::prelude::*;

// Re-export the derive for resource enums
pub use table_derive::ResourceKind;

// Common external dependencies
pub use anyhow;
pub use async_trait;
pub use sqlx;
pub use tokio;
