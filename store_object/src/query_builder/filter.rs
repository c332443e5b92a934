//! Filter and constraint translation
//!
//! A [`Filter`] is an open predicate set that may match any number of rows. A
//! [`Constraint`] names fields that together identify at most one row. In both, a field
//! whose value is `None` is undefined, which is different from `Some(SqlValue::Null)`.

use crate::query_builder::ir::QueryParts;
use crate::validation::sanitize_field_name;
use serde_json::json;
use type_mapping::{value_to_json, SqlValue};

/// Discriminator field that marks a value as a filter; never translated into SQL
pub const FILTER_TAG_FIELD: &str = "_t";

/// Domain filter: ordered `(field, value)` pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Vec<(String, Option<SqlValue>)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain `field` to `value`. An array value matches any of its items.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.fields.push((field.into(), Some(value.into())));
        self
    }

    /// Constrain `field` to be NULL
    pub fn is_null(self, field: impl Into<String>) -> Self {
        self.with(field, SqlValue::Null)
    }

    /// Mention `field` without constraining it
    pub fn unset(mut self, field: impl Into<String>) -> Self {
        self.fields.push((field.into(), None));
        self
    }

    /// All fields, including undefined ones
    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&SqlValue>)> {
        self.fields.iter().map(|(f, v)| (f.as_str(), v.as_ref()))
    }

    /// Fields with a defined value
    pub fn defined(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields
            .iter()
            .filter_map(|(f, v)| v.as_ref().map(|v| (f.as_str(), v)))
    }

    /// Whether any field other than the discriminator is present
    pub fn has_predicates(&self) -> bool {
        self.fields.iter().any(|(f, _)| f != FILTER_TAG_FIELD)
    }
}

/// Unique-key lookup: ordered `(field, value)` pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraint {
    fields: Vec<(String, Option<SqlValue>)>,
}

impl Constraint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-field constraint, usually the primary key
    pub fn by(field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::new().with(field, value)
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.fields.push((field.into(), Some(value.into())));
        self
    }

    /// Name a field whose value is not known. The constraint can then never match.
    pub fn unset(mut self, field: impl Into<String>) -> Self {
        self.fields.push((field.into(), None));
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&SqlValue>)> {
        self.fields.iter().map(|(f, v)| (f.as_str(), v.as_ref()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Translated constraint. Params stay optional so incomplete constraints can be detected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintParts {
    pub where_clauses: Vec<String>,
    pub params: Vec<Option<SqlValue>>,
}

impl ConstraintParts {
    /// Every placeholder has a value
    pub fn is_complete(&self) -> bool {
        self.params.iter().all(Option::is_some)
    }

    /// Query fragments, or `None` if any value is undefined
    pub fn to_query_parts(&self) -> Option<QueryParts> {
        let params = self.params.iter().cloned().collect::<Option<Vec<_>>>()?;
        Some(QueryParts {
            where_clauses: self.where_clauses.clone(),
            params,
            ..QueryParts::default()
        })
    }

    /// JSON description used in logs and as the cache key
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "where": self.where_clauses,
            "params": self
                .params
                .iter()
                .map(|p| p.as_ref().map(value_to_json))
                .collect::<Vec<_>>(),
        })
    }
}

/// Default translation of one filter field.
///
/// The discriminator is ignored. Field names are sanitized. Arrays become `IN (?)` bound to
/// the whole array, NULL becomes `IS NULL` with no parameter, anything else becomes `= ?`.
pub fn default_filter_field(field: &str, value: &SqlValue) -> QueryParts {
    if field == FILTER_TAG_FIELD {
        return QueryParts::new();
    }

    let field = sanitize_field_name(field);
    match value {
        SqlValue::Array(_) => {
            QueryParts::new().filter(format!("`{}` IN (?)", field), [value.clone()])
        }
        SqlValue::Null => QueryParts::new().filter(format!("`{}` IS NULL", field), []),
        _ => QueryParts::new().filter(format!("`{}` = ?", field), [value.clone()]),
    }
}

/// Default translation of a constraint: one `` `field` = ? `` per field, ANDed.
///
/// Field names are embedded as given; constraints come from typed call sites.
pub fn default_constraint(constraint: &Constraint) -> ConstraintParts {
    let (where_clauses, params) = constraint
        .fields()
        .map(|(field, value)| (format!("`{}` = ?", field), value.cloned()))
        .unzip();
    ConstraintParts {
        where_clauses,
        params,
    }
}
