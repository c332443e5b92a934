//! Query builder utilities
//!
//! This module provides the query IR, its composer, and the translators that turn
//! filters, constraints and collection parameters into IR fragments.

pub mod compose;
pub mod filter;
pub mod ir;
pub mod ordering;
pub mod pagination;


pub use compose::{merge, render, RenderedQuery};
pub use filter::{
    default_constraint, default_filter_field, Constraint, ConstraintParts, Filter,
    FILTER_TAG_FIELD,
};
pub use ir::{Query, QueryParts, StatementKind};
pub use ordering::{parse_sort, SortOrder};
pub use pagination::{
    decode_cursor, encode_cursor, paginate, CollectionParams, PageMeta, PagePosition, PageRequest,
};
