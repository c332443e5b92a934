//! Traits for resource access
//!
//! This module contains the traits that define the seams of the resourcehaus core:
//! resource types, SQL execution, query customization and the public access interface.

pub mod access;
pub mod executor;
pub mod resource_kind;
pub mod strategy;

// Re-export all public items for convenience
pub use access::ResourceAccess;
pub use executor::SqlExecutor;
pub use resource_kind::ResourceKind;
pub use strategy::{default_collection_params, CollectionQuery, DefaultStrategy, QueryStrategy};
