//! Error types for the ResourceHaus crate
//!
//! This module contains the errors returned while setting ResourceHaus up. Store operations
//! return [`StoreError`] directly.

use cache_system::CacheError;
use config::ConfigError;
use store_object::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResourceHausError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cache setup error: {0}")]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
