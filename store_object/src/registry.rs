//! Resource registry
//!
//! Per-type configuration (table override, defaults, relationships, primary-key override,
//! id rendering) is declared once through an exhaustive `match` over the resource enum and
//! validated when the registry is built. It is read-only afterwards.

use crate::id_type::{new_id, new_id_text, HexOptions};
use crate::traits::ResourceKind;
use crate::validation::{ValidatedTableName, ValidationError};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use type_mapping::{Record, SqlValue};

/// A default for a field omitted on creation
#[derive(Clone)]
pub enum DefaultValue {
    Literal(SqlValue),
    /// Invoked once per save, e.g. a creation timestamp
    Generator(Arc<dyn Fn() -> SqlValue + Send + Sync>),
}

impl DefaultValue {
    pub fn generator<F>(f: F) -> Self
    where
        F: Fn() -> SqlValue + Send + Sync + 'static,
    {
        DefaultValue::Generator(Arc::new(f))
    }

    pub fn resolve(&self) -> SqlValue {
        match self {
            DefaultValue::Literal(value) => value.clone(),
            DefaultValue::Generator(generate) => generate(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            DefaultValue::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

/// Field defaults of one resource type
#[derive(Debug, Clone, Default)]
pub struct Defaults {
    fields: IndexMap<String, DefaultValue>,
}

impl Defaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn literal(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.fields
            .insert(field.into(), DefaultValue::Literal(value.into()));
        self
    }

    pub fn generated<F>(mut self, field: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> SqlValue + Send + Sync + 'static,
    {
        self.fields.insert(field.into(), DefaultValue::generator(f));
        self
    }

    /// Combine two default sets; fields in `other` win
    pub fn merge(mut self, other: Defaults) -> Self {
        self.fields.extend(other.fields);
        self
    }

    /// Concrete values, with every generator invoked now
    pub fn materialize(&self) -> Record {
        self.fields
            .iter()
            .map(|(field, default)| (field.clone(), default.resolve()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// `id` generated as 16 raw bytes of a time-ordered UUID
pub fn binary_id_default() -> Defaults {
    Defaults::new().generated("id", || SqlValue::Bytes(new_id()))
}

/// `id` generated as time-ordered UUID text
pub fn text_id_default() -> Defaults {
    Defaults::new().generated("id", || SqlValue::Text(new_id_text()))
}

/// Declared configuration of one resource type
#[derive(Debug, Clone, Default)]
pub struct ResourceSpec {
    pub table: Option<String>,
    pub primary_key: Option<String>,
    pub defaults: Defaults,
    /// Field name to related resource tag
    pub relationships: IndexMap<String, String>,
    pub hex: HexOptions,
}

impl ResourceSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn primary_key(mut self, field: impl Into<String>) -> Self {
        self.primary_key = Some(field.into());
        self
    }

    pub fn defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn relationship(
        mut self,
        field: impl Into<String>,
        related_tag: impl Into<String>,
    ) -> Self {
        self.relationships.insert(field.into(), related_tag.into());
        self
    }

    pub fn hex_options(mut self, options: HexOptions) -> Self {
        self.hex = options;
        self
    }
}

/// Validated configuration of one resource type
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    pub tag: &'static str,
    pub table: ValidatedTableName,
    pub primary_key: String,
    pub defaults: Defaults,
    pub relationships: IndexMap<String, String>,
    pub hex: HexOptions,
}

impl ResourceEntry {
    /// Related resource tag if `field` is a relationship
    pub fn relationship(&self, field: &str) -> Option<&str> {
        self.relationships.get(field).map(String::as_str)
    }
}

/// Configuration of every resource type of `R`
#[derive(Debug, Clone)]
pub struct ResourceRegistry<R: ResourceKind> {
    entries: HashMap<R, ResourceEntry>,
}

impl<R: ResourceKind> ResourceRegistry<R> {
    /// Build from a spec function, normally an exhaustive `match` over `R`.
    ///
    /// Fails if a table name is unusable, two types share a tag, or a relationship names a
    /// tag that is not part of `R`.
    pub fn build<F>(spec_for: F) -> Result<Self, ValidationError>
    where
        F: Fn(R) -> ResourceSpec,
    {
        let tags: HashSet<&'static str> = R::all().iter().map(|k| k.tag()).collect();
        let mut seen = HashSet::new();
        let mut entries = HashMap::with_capacity(R::all().len());

        for &kind in R::all() {
            if !seen.insert(kind.tag()) {
                return Err(ValidationError::DuplicateTag(kind.tag().to_string()));
            }

            let spec = spec_for(kind);
            let table = ValidatedTableName::new(spec.table.as_deref().unwrap_or(kind.table()))?;
            let primary_key = spec
                .primary_key
                .unwrap_or_else(|| kind.primary_key().to_string());
            if primary_key.is_empty() {
                return Err(ValidationError::Empty);
            }

            for (field, related) in &spec.relationships {
                if !tags.contains(related.as_str()) {
                    return Err(ValidationError::UnknownRelationship {
                        field: field.clone(),
                        tag: related.clone(),
                    });
                }
            }

            entries.insert(
                kind,
                ResourceEntry {
                    tag: kind.tag(),
                    table,
                    primary_key,
                    defaults: spec.defaults,
                    relationships: spec.relationships,
                    hex: spec.hex,
                },
            );
        }

        Ok(Self { entries })
    }

    /// Registry where every type uses its declared table and key with no defaults
    pub fn plain() -> Result<Self, ValidationError> {
        Self::build(|_| ResourceSpec::new())
    }

    /// Entry for `kind`. Every variant is present after a successful build.
    pub fn entry(&self, kind: R) -> &ResourceEntry {
        match self.entries.get(&kind) {
            Some(entry) => entry,
            // build() inserts every R::all() variant
            None => unreachable!("resource kind {:?} missing from registry", kind),
        }
    }
}
