//! Unified value model shared across the resourcehaus ecosystem
//!
//! Every crate in the workspace speaks in terms of [`SqlValue`] and [`Record`]: the executor
//! decodes rows into records, the query composer binds values, and the event layer renders
//! records to JSON for audit and pubsub payloads.

pub mod serialize;
pub mod sql;
pub mod types;
pub mod validate;

pub use serialize::{record_to_json, value_to_json};
pub use sql::{classify_column_type, ColumnKind};
pub use types::{Record, SqlValue};
pub use validate::{is_bindable, BindError};
