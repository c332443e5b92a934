//! Validation utilities for bound values
//!
//! Positional parameters are either scalars or a single level of array (which the driver
//! expands into a placeholder list). Nested arrays and JSON inside arrays cannot be bound.

use crate::types::SqlValue;
use std::fmt;

/// A parameter the driver cannot bind
#[derive(Debug, Clone, PartialEq)]
pub enum BindError {
    /// An array nested inside another array
    NestedArray { position: usize },
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::NestedArray { position } => {
                write!(f, "Parameter {} contains a nested array, which cannot be bound", position)
            }
        }
    }
}

impl std::error::Error for BindError {}

/// Check that every parameter can be bound by the driver
pub fn is_bindable(params: &[SqlValue]) -> Result<(), BindError> {
    for (position, param) in params.iter().enumerate() {
        if let SqlValue::Array(items) = param {
            if items.iter().any(|item| matches!(item, SqlValue::Array(_))) {
                return Err(BindError::NestedArray { position });
            }
        }
    }
    Ok(())
}
