//! # ResourceHaus
//!
//! A typed resource-access layer for MySQL. Every resource type of an application is one
//! variant of a `ResourceKind` enum; a single store serves them all with filtered and paged
//! reads, cached single-resource lookups, diffing writes and batched deletes. Writes
//! invalidate the cache and are reported to an audit client and an event publisher.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resourcehaus::prelude::*;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ResourceKind)]
//! pub enum Resource {
//!     Users,
//!     #[resource(tag = "org-roles", table = "organization-roles")]
//!     OrgRoles,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let haus = ResourceHaus::new(config).await?;
//!
//!     let registry = ResourceRegistry::build(|kind| match kind {
//!         Resource::Users => ResourceSpec::new().defaults(binary_id_default()),
//!         Resource::OrgRoles => ResourceSpec::new().relationship("userId", "users"),
//!     })?;
//!     let store = haus.store(registry);
//!
//!     let mut user = Record::new();
//!     user.insert("name".to_string(), "John Doe".into());
//!     let created = store.save(Resource::Users, user, &AuthContext::new()).await?;
//!
//!     let page = store
//!         .get(Resource::Users, GetRequest::filter(Filter::new().with("name", "John Doe")))
//!         .await?
//!         .into_collection()?;
//!     println!("{} user(s), first id {:?}", page.data.len(), created.get("id"));
//!
//!     Ok(())
//! }
//! ```

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use core::ResourceHaus;
pub use errors::ResourceHausError;

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, DatabaseConfig, StoreConfig};

// Re-export internal crates used by macros and public API
// These MUST be public for the generated macro code to work correctly
pub use store_object;
pub use table_derive;
pub use cache_system;
pub use signal_system;
pub use type_mapping;

// Re-export external dependencies used in public API
pub use sqlx;
pub use async_trait;
