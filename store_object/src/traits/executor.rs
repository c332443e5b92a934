//! SQL execution seam

use crate::errors::StoreError;
use async_trait::async_trait;
use std::sync::Arc;
use type_mapping::{Record, SqlValue};

/// Runs one statement with positional `?` parameters.
///
/// An [`SqlValue::Array`] parameter stands for a list: implementations expand it into one
/// placeholder per item (an IN list, or the values of an INSERT row).
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    async fn execute(
        &self,
        query: &str,
        params: Option<&[SqlValue]>,
    ) -> Result<Vec<Record>, StoreError>;
}

#[async_trait]
impl<T: SqlExecutor + ?Sized> SqlExecutor for Arc<T> {
    async fn execute(
        &self,
        query: &str,
        params: Option<&[SqlValue]>,
    ) -> Result<Vec<Record>, StoreError> {
        (**self).execute(query, params).await
    }
}
