//! Merging and rendering of [`Query`] values

use crate::query_builder::ir::{Query, QueryParts, StatementKind};
use type_mapping::SqlValue;

/// Final statement text and its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedQuery {
    pub text: String,
    /// `None` when the statement has no placeholders, so callers can skip binding entirely
    pub params: Option<Vec<SqlValue>>,
}

impl RenderedQuery {
    pub fn params(&self) -> &[SqlValue] {
        self.params.as_deref().unwrap_or(&[])
    }
}

/// Fold `add` into `base`.
///
/// WHERE fragments, params and sort clauses are appended in order. A limit in `add` replaces
/// the base limit. For SELECT statements the select list, joins, GROUP BY and HAVING are
/// appended too. Nothing is removed or deduplicated.
pub fn merge(mut base: Query, add: QueryParts) -> Query {
    base.where_clauses.extend(add.where_clauses);
    base.params.extend(add.params);
    base.sort.extend(add.sort);
    if add.limit.is_some() {
        base.limit = add.limit;
    }

    if base.kind == StatementKind::Select {
        base.select.extend(add.select);
        base.join.extend(add.join);
        base.group_by.extend(add.group_by);
        base.having.extend(add.having);
    }

    base
}

fn and_joined(fragments: &[String]) -> String {
    format!("({})", fragments.join(") AND ("))
}

/// Render a statement to text plus parameters. Every `?` must have exactly one param.
pub fn render(query: &Query) -> RenderedQuery {
    debug_assert_eq!(
        query.placeholder_count(),
        query.params.len(),
        "placeholders and params disagree"
    );
    let mut text = match query.kind {
        StatementKind::Select => format!("SELECT {} FROM {}", query.select.join(", "), query.from),
        StatementKind::Delete => format!("DELETE FROM {}", query.from),
    };

    if query.kind == StatementKind::Select && !query.join.is_empty() {
        text.push_str(" JOIN ");
        text.push_str(&query.join.join(" JOIN "));
    }

    if !query.where_clauses.is_empty() {
        text.push_str(" WHERE ");
        text.push_str(&and_joined(&query.where_clauses));
    }

    if query.kind == StatementKind::Select {
        if !query.group_by.is_empty() {
            text.push_str(" GROUP BY ");
            text.push_str(&query.group_by.join(", "));
        }
        if !query.having.is_empty() {
            text.push_str(" HAVING ");
            text.push_str(&and_joined(&query.having));
        }
    }

    if !query.sort.is_empty() {
        text.push_str(" ORDER BY ");
        text.push_str(&query.sort.join(", "));
    }

    if let Some(limit) = &query.limit {
        text.push_str(" LIMIT ");
        text.push_str(limit);
    }

    RenderedQuery {
        text,
        params: if query.params.is_empty() {
            None
        } else {
            Some(query.params.clone())
        },
    }
}

impl Query {
    pub fn merge(self, add: QueryParts) -> Self {
        merge(self, add)
    }

    pub fn render(&self) -> RenderedQuery {
        render(self)
    }
}
