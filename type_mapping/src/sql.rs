//! SQL type classification
//!
//! Maps MySQL column type names, as reported by the driver, to the strategy used to
//! decode a column into a [`crate::SqlValue`].

/// How a column should be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Bool,
    SignedInt,
    UnsignedInt,
    Float,
    Text,
    Binary,
    Json,
    DateTime,
    Date,
    Time,
    /// NULL-typed column (e.g. `SELECT NULL`)
    Null,
    /// Anything else is read as text
    Other,
}

/// Classify a MySQL type name (`BIGINT`, `VARBINARY`, `INT UNSIGNED`, ...)
pub fn classify_column_type(type_name: &str) -> ColumnKind {
    // Normalize type string for consistent matching
    let normalized = type_name.trim().to_ascii_uppercase();
    let unsigned = normalized.ends_with("UNSIGNED");
    let base = normalized.split_whitespace().next().unwrap_or("");

    match base {
        "BOOLEAN" | "BOOL" => ColumnKind::Bool,
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" | "YEAR" => {
            if unsigned {
                ColumnKind::UnsignedInt
            } else {
                ColumnKind::SignedInt
            }
        }
        "FLOAT" | "DOUBLE" | "REAL" => ColumnKind::Float,
        "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET"
        | "DECIMAL" | "NUMERIC" => ColumnKind::Text,
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT"
        | "GEOMETRY" => ColumnKind::Binary,
        "JSON" => ColumnKind::Json,
        "DATETIME" | "TIMESTAMP" => ColumnKind::DateTime,
        "DATE" => ColumnKind::Date,
        "TIME" => ColumnKind::Time,
        "NULL" => ColumnKind::Null,
        _ => ColumnKind::Other,
    }
}
