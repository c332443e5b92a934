//! Query intermediate representation
//!
//! A [`Query`] describes one SELECT or DELETE statement as lists of SQL fragments plus the
//! positional parameters their `?` placeholders bind to. [`QueryParts`] is the partial form
//! that translators produce and [`Query::merge`] folds in.

use crate::validation::ValidatedTableName;
use type_mapping::SqlValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Delete,
}

/// Fragments to merge into a [`Query`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParts {
    pub select: Vec<String>,
    pub join: Vec<String>,
    pub where_clauses: Vec<String>,
    pub params: Vec<SqlValue>,
    pub group_by: Vec<String>,
    pub having: Vec<String>,
    pub sort: Vec<String>,
    /// `"<offset>,<count>"` or `"<count>"`
    pub limit: Option<String>,
}

impl QueryParts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a WHERE fragment and the parameters its placeholders bind to
    pub fn filter<I>(mut self, clause: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = SqlValue>,
    {
        self.where_clauses.push(clause.into());
        self.params.extend(params);
        self
    }

    pub fn join(mut self, clause: impl Into<String>) -> Self {
        self.join.push(clause.into());
        self
    }

    pub fn select(mut self, column: impl Into<String>) -> Self {
        self.select.push(column.into());
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
        self
    }

    pub fn having(mut self, clause: impl Into<String>) -> Self {
        self.having.push(clause.into());
        self
    }

    pub fn sort(mut self, clause: impl Into<String>) -> Self {
        self.sort.push(clause.into());
        self
    }

    pub fn limit(mut self, limit: impl Into<String>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One SELECT or DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub kind: StatementKind,
    /// Rendered source, e.g. `` `users` AS `us` ``
    pub from: String,
    pub select: Vec<String>,
    pub join: Vec<String>,
    pub where_clauses: Vec<String>,
    pub params: Vec<SqlValue>,
    pub group_by: Vec<String>,
    pub having: Vec<String>,
    pub sort: Vec<String>,
    pub limit: Option<String>,
}

impl Query {
    fn empty(kind: StatementKind, from: String) -> Self {
        Self {
            kind,
            from,
            select: Vec::new(),
            join: Vec::new(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            sort: Vec::new(),
            limit: None,
        }
    }

    /// `` SELECT `al`.* FROM `table` AS `al` `` where the alias is the table's first two characters
    pub fn select_all(table: &ValidatedTableName) -> Self {
        let alias = table.alias();
        let mut query = Self::empty(
            StatementKind::Select,
            format!("{} AS `{}`", table.quoted(), alias),
        );
        query.select.push(format!("`{}`.*", alias));
        query
    }

    /// `` DELETE FROM `table` ``
    pub fn delete_from(table: &ValidatedTableName) -> Self {
        Self::empty(StatementKind::Delete, table.quoted())
    }

    /// Number of `?` placeholders across the fragments that carry parameters.
    /// Marks inside quoted names or literals are not placeholders.
    pub fn placeholder_count(&self) -> usize {
        let count = |fragments: &[String]| {
            fragments
                .iter()
                .map(|f| count_placeholders(f))
                .sum::<usize>()
        };
        match self.kind {
            StatementKind::Select => {
                count(&self.select)
                    + count(&self.join)
                    + count(&self.where_clauses)
                    + count(&self.having)
            }
            StatementKind::Delete => count(&self.where_clauses),
        }
    }
}

fn count_placeholders(fragment: &str) -> usize {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut count = 0;
    for c in fragment.chars() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' && q != '`' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '?' => count += 1,
                _ => {}
            },
        }
    }
    count
}
