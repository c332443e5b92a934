//! Store Object - resource access core for ResourceHaus
//!
//! This crate provides the query IR and composer, filter and constraint translation,
//! pagination, the change reconciler and the [`ResourceStore`] facade tying them to an
//! [`SqlExecutor`], a cache, an audit client and a publisher.

pub mod errors;
pub mod generic_store;
pub mod id_type;
pub mod mysql;
pub mod prelude;
pub mod query_builder;
pub mod reconcile;
pub mod registry;
pub mod request;
pub mod traits;
pub mod validation;

pub use cache_system::CacheParams;
pub use errors::StoreError;
pub use generic_store::ResourceStore;
pub use id_type::{buffers_to_hex, hex_to_buffers, id_to_text, new_id, text_to_id, HexOptions};
pub use mysql::MySqlExecutor;
pub use query_builder::{
    CollectionParams, Constraint, Filter, PageMeta, PageRequest, Query, QueryParts, SortOrder,
};
pub use reconcile::{reconcile, Reconciled};
pub use registry::{Defaults, ResourceEntry, ResourceRegistry, ResourceSpec};
pub use request::{Collection, DeleteTarget, GetRequest, GetResponse};
pub use traits::*;
pub use type_mapping::{Record, SqlValue};
pub use validation::{ValidatedTableName, ValidationError};
