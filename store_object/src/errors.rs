use cache_system::CacheError;
use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Malformed caller input (cursor, sort clause)
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {message}")]
    NotFound {
        message: String,
        /// Machine-readable code, e.g. `RESOURCE-NOT-FOUND.USERS`
        code: Option<String>,
    },

    /// Programming error in the calling code
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Audit error: {0}")]
    Audit(#[source] anyhow::Error),

    #[error("Publish error: {0}")]
    Publish(#[source] anyhow::Error),

    #[error("Identifier decoding error: {0}")]
    Codec(#[from] hex::FromHexError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_found(message: impl Into<String>) -> Self {
        StoreError::NotFound {
            message: message.into(),
            code: None,
        }
    }

    pub fn not_found_with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        StoreError::NotFound {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// Wrap a driver error with the operation that produced it
    pub fn database_operation(operation: &str, err: sqlx::Error) -> Self {
        StoreError::DatabaseError(format!("{} failed: {}", operation, err))
    }

    /// HTTP-style status for the error kind
    pub fn status(&self) -> u16 {
        match self {
            StoreError::BadRequest(_) => 400,
            StoreError::NotFound { .. } => 404,
            _ => 500,
        }
    }

    /// Machine-readable code, when the error carries one
    pub fn code(&self) -> Option<&str> {
        match self {
            StoreError::NotFound { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::DatabaseError(err.to_string())
    }
}
