//! Sort-string parsing

use crate::errors::StoreError;
use regex::Regex;
use std::sync::LazyLock;

static CLAUSE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*,\s*").unwrap_or_else(|e| panic!("invalid separator pattern: {e}"))
});

static SORT_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?)(.+)$").unwrap_or_else(|e| panic!("invalid clause pattern: {e}"))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Parse `"-name, +type, age"` into `[(name, Desc), (type, Asc), (age, Asc)]`.
///
/// Field names are returned as written; they are not checked against any schema.
pub fn parse_sort(sort: &str) -> Result<Vec<(String, SortOrder)>, StoreError> {
    CLAUSE_SEPARATOR
        .split(sort.trim())
        .filter(|clause| !clause.is_empty())
        .map(|clause| {
            let captures = SORT_CLAUSE.captures(clause).ok_or_else(|| {
                StoreError::BadRequest(format!(
                    "Invalid sort clause: '{}'. Sort must be a comma-separated list of clauses \
                     matching the regex /^([+-]?)(.+)$/",
                    clause
                ))
            })?;
            let order = match &captures[1] {
                "-" => SortOrder::Desc,
                _ => SortOrder::Asc,
            };
            Ok((captures[2].to_string(), order))
        })
        .collect()
}
