//! Convenience re-exports for common store-object usage

// Core traits
pub use crate::traits::{
    DefaultStrategy, QueryStrategy, ResourceAccess, ResourceKind, SqlExecutor,
};

// Error types
pub use crate::errors::StoreError;

// Store and executor
pub use crate::generic_store::ResourceStore;
pub use crate::mysql::MySqlExecutor;

// Registry
pub use crate::registry::{
    binary_id_default, text_id_default, Defaults, ResourceRegistry, ResourceSpec,
};

// Requests and responses
pub use crate::request::{Collection, DeleteTarget, GetRequest, GetResponse};

// Query building
pub use crate::query_builder::{
    default_constraint, default_filter_field, CollectionParams, Constraint, Filter, PageRequest,
    QueryParts, SortOrder,
};

// Identifier helpers
pub use crate::id_type::{id_to_text, new_id, text_to_id, HexOptions};

// Cache params (re-exported from cache_system)
pub use crate::CacheParams;

// Values and events
pub use signal_system::{AuditClient, AuthContext, DomainEvent, Publisher};
pub use type_mapping::{Record, SqlValue};

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use sqlx::MySqlPool;
