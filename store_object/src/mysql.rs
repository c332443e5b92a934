//! MySQL executor
//!
//! Runs rendered statements on a `sqlx` pool or inside a transaction, expanding array
//! parameters into placeholder lists and decoding rows into [`Record`]s.

use crate::errors::StoreError;
use crate::traits::SqlExecutor;
use async_trait::async_trait;
use sqlx::mysql::{MySqlArguments, MySqlPool, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, MySql, Row, Transaction, TypeInfo};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use type_mapping::{classify_column_type, is_bindable, ColumnKind, Record, SqlValue};

type SharedTransaction = Arc<Mutex<Option<Transaction<'static, MySql>>>>;

#[derive(Clone)]
enum Target {
    Pool(MySqlPool),
    Transaction(SharedTransaction),
}

/// [`SqlExecutor`] over MySQL
#[derive(Clone)]
pub struct MySqlExecutor {
    target: Target,
}

impl std::fmt::Debug for MySqlExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlExecutor")
            .field("in_transaction", &self.in_transaction())
            .finish()
    }
}

impl MySqlExecutor {
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            target: Target::Pool(pool),
        }
    }

    pub fn in_transaction(&self) -> bool {
        matches!(self.target, Target::Transaction(_))
    }

    /// Run `f` with an executor bound to a fresh transaction.
    ///
    /// The transaction commits when `f` returns `Ok` and rolls back otherwise.
    pub async fn with_transaction<F, Fut, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(MySqlExecutor) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let Target::Pool(pool) = &self.target else {
            return Err(StoreError::InternalServerError(
                "Nested transactions are not supported".to_string(),
            ));
        };

        let tx = pool
            .begin()
            .await
            .map_err(|e| StoreError::database_operation("Begin transaction", e))?;
        let shared: SharedTransaction = Arc::new(Mutex::new(Some(tx)));

        let result = f(MySqlExecutor {
            target: Target::Transaction(shared.clone()),
        })
        .await;

        let Some(tx) = shared.lock().await.take() else {
            return result;
        };

        match result {
            Ok(value) => {
                tx.commit()
                    .await
                    .map_err(|e| StoreError::database_operation("Commit transaction", e))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = %rollback, "Failed to roll back transaction");
                }
                Err(err)
            }
        }
    }
}

#[async_trait]
impl SqlExecutor for MySqlExecutor {
    async fn execute(
        &self,
        query: &str,
        params: Option<&[SqlValue]>,
    ) -> Result<Vec<Record>, StoreError> {
        let (text, values) = expand_placeholders(query, params.unwrap_or_default())?;

        let mut statement = sqlx::query(&text);
        for value in values {
            statement = bind_value(statement, value);
        }

        let rows = match &self.target {
            Target::Pool(pool) => statement.fetch_all(pool).await,
            Target::Transaction(shared) => {
                let mut guard = shared.lock().await;
                let Some(tx) = guard.as_mut() else {
                    return Err(StoreError::InternalServerError(
                        "Transaction already finished".to_string(),
                    ));
                };
                statement.fetch_all(&mut **tx).await
            }
        }
        .map_err(|e| StoreError::database_operation("Query", e))?;

        rows.iter().map(decode_row).collect()
    }
}

/// Rewrite `?` placeholders for the driver.
///
/// An array parameter becomes one placeholder per item, or a literal `NULL` when empty.
/// Question marks inside quoted strings and identifiers are left alone.
pub fn expand_placeholders(
    query: &str,
    params: &[SqlValue],
) -> Result<(String, Vec<SqlValue>), StoreError> {
    is_bindable(params).map_err(|e| StoreError::InternalServerError(e.to_string()))?;

    let mut text = String::with_capacity(query.len());
    let mut values = Vec::with_capacity(params.len());
    let mut remaining = params.iter();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in query.chars() {
        if let Some(open) = quote {
            text.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' && open != '`' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                text.push(c);
            }
            '?' => {
                let param = remaining.next().ok_or_else(|| {
                    StoreError::InternalServerError(format!(
                        "Not enough parameters for query ({} given): {}",
                        params.len(),
                        query
                    ))
                })?;
                match param {
                    SqlValue::Array(items) if items.is_empty() => text.push_str("NULL"),
                    SqlValue::Array(items) => {
                        text.push_str(&vec!["?"; items.len()].join(", "));
                        values.extend(items.iter().cloned());
                    }
                    other => {
                        text.push('?');
                        values.push(other.clone());
                    }
                }
            }
            _ => text.push(c),
        }
    }

    if remaining.next().is_some() {
        return Err(StoreError::InternalServerError(format!(
            "Too many parameters for query ({} given): {}",
            params.len(),
            query
        )));
    }

    Ok((text, values))
}

fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: SqlValue,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        SqlValue::Null => query.bind(Option::<String>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Bytes(b) => query.bind(b),
        SqlValue::Json(v) => query.bind(sqlx::types::Json(v)),
        // Arrays are expanded before binding
        other @ SqlValue::Array(_) => query.bind(other.to_text()),
    }
}

fn decode_row(row: &MySqlRow) -> Result<Record, StoreError> {
    let mut record = Record::with_capacity(row.columns().len());
    for (index, column) in row.columns().iter().enumerate() {
        let type_name = column.type_info().name();
        let value = decode_column(row, index, type_name)
            .map_err(|e| StoreError::database_operation("Decode row", e))?;
        record.insert(column.name().to_string(), value);
    }
    Ok(record)
}

fn decode_column(row: &MySqlRow, index: usize, type_name: &str) -> Result<SqlValue, sqlx::Error> {
    let value = match classify_column_type(type_name) {
        ColumnKind::Bool => row.try_get::<Option<bool>, _>(index)?.into(),
        ColumnKind::SignedInt => row.try_get::<Option<i64>, _>(index)?.into(),
        ColumnKind::UnsignedInt => match row.try_get::<Option<u64>, _>(index)? {
            Some(v) => i64::try_from(v)
                .map(SqlValue::Int)
                .unwrap_or_else(|_| SqlValue::Text(v.to_string())),
            None => SqlValue::Null,
        },
        ColumnKind::Float if type_name.eq_ignore_ascii_case("FLOAT") => row
            .try_get::<Option<f32>, _>(index)?
            .map(|v| SqlValue::Float(f64::from(v)))
            .unwrap_or(SqlValue::Null),
        ColumnKind::Float => row.try_get::<Option<f64>, _>(index)?.into(),
        ColumnKind::Binary => row.try_get::<Option<Vec<u8>>, _>(index)?.into(),
        ColumnKind::Json => row
            .try_get::<Option<sqlx::types::Json<serde_json::Value>>, _>(index)?
            .map(|v| SqlValue::Json(v.0))
            .unwrap_or(SqlValue::Null),
        ColumnKind::DateTime => row.try_get::<Option<chrono::NaiveDateTime>, _>(index)?.into(),
        ColumnKind::Date => row
            .try_get::<Option<chrono::NaiveDate>, _>(index)?
            .map(|d| SqlValue::Text(d.to_string()))
            .unwrap_or(SqlValue::Null),
        ColumnKind::Time => row
            .try_get::<Option<chrono::NaiveTime>, _>(index)?
            .map(|t| SqlValue::Text(t.to_string()))
            .unwrap_or(SqlValue::Null),
        ColumnKind::Null => SqlValue::Null,
        ColumnKind::Text | ColumnKind::Other => {
            row.try_get_unchecked::<Option<String>, _>(index)?.into()
        }
    };
    Ok(value)
}
