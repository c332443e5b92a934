//! Per-resource query customization
//!
//! A [`QueryStrategy`] decides how filters, collection parameters, sort strings and
//! constraints become SQL. Every method has a default; a custom strategy overrides the
//! ones it needs and calls the matching `default_*` function for everything else.
//!
//! ```ignore
//! struct UserQueries;
//!
//! impl QueryStrategy<Resource> for UserQueries {
//!     fn filter_field(&self, kind: Resource, field: &str, value: &SqlValue)
//!         -> Result<QueryParts, StoreError>
//!     {
//!         match (kind, field) {
//!             (Resource::Users, "nameLike") => Ok(QueryParts::new()
//!                 .filter("`name` LIKE ?", [value.clone()])),
//!             _ => Ok(default_filter_field(field, value)),
//!         }
//!     }
//! }
//! ```

use crate::errors::StoreError;
use crate::query_builder::{
    default_constraint, default_filter_field, paginate, parse_sort, CollectionParams, Constraint,
    ConstraintParts, PageMeta, QueryParts, SortOrder,
};
use crate::traits::resource_kind::ResourceKind;
use crate::validation::sanitize_field_name;
use type_mapping::SqlValue;

/// Paging and sort fragments of a collection request plus the page metadata
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionQuery {
    pub parts: QueryParts,
    pub meta: PageMeta,
}

pub trait QueryStrategy<R: ResourceKind>: Send + Sync {
    /// Translate one defined filter field
    fn filter_field(
        &self,
        kind: R,
        field: &str,
        value: &SqlValue,
    ) -> Result<QueryParts, StoreError> {
        let _ = kind;
        Ok(default_filter_field(field, value))
    }

    /// Translate paging and sorting
    fn collection_params(
        &self,
        kind: R,
        params: Option<&CollectionParams>,
        default_page_size: u64,
    ) -> Result<CollectionQuery, StoreError> {
        default_collection_params(self, kind, params, default_page_size)
    }

    /// Parse a sort string. Override to restrict sortable fields.
    fn parse_sort(&self, kind: R, sort: &str) -> Result<Vec<(String, SortOrder)>, StoreError> {
        let _ = kind;
        parse_sort(sort)
    }

    /// Translate a unique-key constraint
    fn constraint(&self, kind: R, constraint: &Constraint) -> ConstraintParts {
        let _ = kind;
        default_constraint(constraint)
    }
}

/// Strategy that uses every default
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStrategy;

impl<R: ResourceKind> QueryStrategy<R> for DefaultStrategy {}

/// Default paging and sorting: a `"<offset>,<count>"` limit and one ORDER BY clause per
/// parsed sort field, with field names sanitized.
pub fn default_collection_params<R, S>(
    strategy: &S,
    kind: R,
    params: Option<&CollectionParams>,
    default_page_size: u64,
) -> Result<CollectionQuery, StoreError>
where
    R: ResourceKind,
    S: QueryStrategy<R> + ?Sized,
{
    let position = paginate(params.and_then(|p| p.page.as_ref()), default_page_size)?;
    let mut parts = QueryParts::new().limit(position.limit);

    let sort = params
        .and_then(|p| p.sort.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty());
    if let Some(sort) = sort {
        for (field, order) in strategy.parse_sort(kind, sort)? {
            parts = parts.sort(format!("`{}` {}", sanitize_field_name(&field), order.to_sql()));
        }
    }

    Ok(CollectionQuery {
        parts,
        meta: PageMeta {
            size: position.size,
            sort: sort.map(str::to_string),
            prev_cursor: position.prev_cursor,
            next_cursor: Some(position.next_cursor),
        },
    })
}
