//! Validation module
//!
//! Identifiers are embedded in SQL as backtick-quoted text because they cannot be bound
//! as parameters. Table names are validated once at startup; field names coming from
//! filters and sort strings are sanitized on every call.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Quote characters and SQL comment openers stripped from field names
static UNSAFE_IDENTIFIER_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[`'"]+|--+"#).unwrap_or_else(|e| panic!("invalid sanitizer pattern: {e}"))
});

/// Validation errors for database identifiers
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Name contains a quote character or `--`
    InvalidCharacters(String),
    /// Name is too long (MySQL limit is 64 characters)
    TooLong {
        name: String,
        length: usize,
        max_length: usize,
    },
    /// Name is empty
    Empty,
    /// Two resource types share a tag
    DuplicateTag(String),
    /// A relationship points at a tag that is not registered
    UnknownRelationship { field: String, tag: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidCharacters(name) => {
                write!(
                    f,
                    "Invalid characters in name '{}': quotes and '--' are not allowed",
                    name
                )
            }
            ValidationError::TooLong {
                name,
                length,
                max_length,
            } => {
                write!(
                    f,
                    "Name '{}' is too long: {} characters (max {})",
                    name, length, max_length
                )
            }
            ValidationError::Empty => {
                write!(f, "Name cannot be empty")
            }
            ValidationError::DuplicateTag(tag) => {
                write!(f, "Resource tag '{}' is registered more than once", tag)
            }
            ValidationError::UnknownRelationship { field, tag } => {
                write!(
                    f,
                    "Relationship field '{}' points at unknown resource type '{}'",
                    field, tag
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Strip backticks, quotes and runs of `-` from a field name
pub fn sanitize_field_name(field: &str) -> String {
    UNSAFE_IDENTIFIER_CHARS.replace_all(field, "").into_owned()
}

/// A validated table name that is safe to embed between backticks
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidatedTableName(String);

impl ValidatedTableName {
    /// MySQL identifier length limit
    const MAX_LENGTH: usize = 64;

    /// Create a new validated table name
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        Self::validate_identifier(name)?;
        Ok(Self(name.to_string()))
    }

    /// Get the validated name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Backtick-quoted form
    pub fn quoted(&self) -> String {
        format!("`{}`", self.0)
    }

    /// Two-character alias used in SELECT statements
    pub fn alias(&self) -> String {
        self.0.chars().take(2).collect()
    }

    fn validate_identifier(name: &str) -> Result<(), ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::Empty);
        }

        if name.chars().count() > Self::MAX_LENGTH {
            return Err(ValidationError::TooLong {
                name: name.to_string(),
                length: name.chars().count(),
                max_length: Self::MAX_LENGTH,
            });
        }

        if sanitize_field_name(name) != name {
            return Err(ValidationError::InvalidCharacters(name.to_string()));
        }

        Ok(())
    }
}

impl fmt::Display for ValidatedTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_field_name() {
        assert_eq!(sanitize_field_name("name"), "name");
        assert_eq!(sanitize_field_name("na`me"), "name");
        assert_eq!(sanitize_field_name("x'\"y"), "xy");
        assert_eq!(sanitize_field_name("name--comment"), "namecomment");
        assert_eq!(sanitize_field_name("name; -- DROP"), "name;  DROP");
        assert_eq!(sanitize_field_name("org-roles"), "org-roles");
    }

    #[test]
    fn test_valid_table_names() {
        for name in ["users", "organization-roles", "user_addresses", "a"] {
            assert!(ValidatedTableName::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_table_names() {
        assert_eq!(ValidatedTableName::new(""), Err(ValidationError::Empty));
        assert!(matches!(
            ValidatedTableName::new("users`; DROP TABLE x"),
            Err(ValidationError::InvalidCharacters(_))
        ));
        assert!(matches!(
            ValidatedTableName::new("users--"),
            Err(ValidationError::InvalidCharacters(_))
        ));
        assert!(matches!(
            ValidatedTableName::new(&"t".repeat(65)),
            Err(ValidationError::TooLong { length: 65, .. })
        ));
    }

    #[test]
    fn test_alias_and_quoting() {
        let table = ValidatedTableName::new("organization-roles").unwrap();
        assert_eq!(table.alias(), "or");
        assert_eq!(table.quoted(), "`organization-roles`");
        assert_eq!(table.to_string(), "organization-roles");
    }
}
