//! Parsing utilities for `#[resource]` variant attributes
//!
//! This module reads the resource enum's variants and validates tags, table names and
//! primary keys at compile time.

use std::collections::HashSet;
use syn::{Attribute, Data, DeriveInput, Error, Fields, Ident, LitStr, Result};

/// Longest identifier MySQL accepts
const MAX_IDENTIFIER_LEN: usize = 64;

#[derive(Debug)]
pub struct VariantInfo {
    pub ident: Ident,
    pub tag: String,
    pub table: String,
    pub primary_key: String,
}

/// Validate a backtick-quoted identifier and return syn::Error for better proc macro error handling
fn validate_quoted_identifier(kind: &str, name: &str, span: proc_macro2::Span) -> Result<()> {
    if name.is_empty() {
        return Err(Error::new(span, format!("{} cannot be empty", kind)));
    }

    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(Error::new(
            span,
            format!(
                "{} '{}' is too long: {} characters (max {})",
                kind,
                name,
                name.len(),
                MAX_IDENTIFIER_LEN
            ),
        ));
    }

    if name.contains(['`', '\'', '"']) || name.contains("--") {
        return Err(Error::new(
            span,
            format!("{} '{}' contains quote characters or '--'", kind, name),
        ));
    }

    Ok(())
}

/// `OrgRoles` -> `org-roles`
pub fn kebab_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, c) in ident.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else if c == '_' {
            out.push('-');
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Default)]
struct ResourceAttr {
    tag: Option<String>,
    table: Option<String>,
    primary_key: Option<String>,
}

fn parse_resource_attr(attrs: &[Attribute]) -> Result<ResourceAttr> {
    let mut parsed = ResourceAttr::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("resource")) {
        attr.parse_nested_meta(|meta| {
            let value: LitStr = meta.value()?.parse()?;
            let slot = if meta.path.is_ident("tag") {
                &mut parsed.tag
            } else if meta.path.is_ident("table") {
                &mut parsed.table
            } else if meta.path.is_ident("primary_key") {
                &mut parsed.primary_key
            } else {
                return Err(meta.error("expected `tag`, `table` or `primary_key`"));
            };
            if slot.is_some() {
                return Err(meta.error("duplicate resource attribute"));
            }
            *slot = Some(value.value());
            Ok(())
        })?;
    }

    Ok(parsed)
}

pub fn parse_resource_variants(input: &DeriveInput) -> Result<Vec<VariantInfo>> {
    let Data::Enum(data_enum) = &input.data else {
        return Err(Error::new_spanned(
            &input.ident,
            "ResourceKind can only be derived for enums",
        ));
    };

    if data_enum.variants.is_empty() {
        return Err(Error::new_spanned(
            &input.ident,
            "ResourceKind requires at least one variant",
        ));
    }

    let mut seen_tags = HashSet::new();
    let mut variants = Vec::with_capacity(data_enum.variants.len());

    for variant in &data_enum.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(Error::new_spanned(
                variant,
                "ResourceKind variants cannot carry fields",
            ));
        }

        let attr = parse_resource_attr(&variant.attrs)?;
        let span = variant.ident.span();

        let tag = attr
            .tag
            .unwrap_or_else(|| kebab_case(&variant.ident.to_string()));
        let table = attr.table.unwrap_or_else(|| tag.clone());
        let primary_key = attr.primary_key.unwrap_or_else(|| "id".to_string());

        validate_quoted_identifier("Resource tag", &tag, span)?;
        validate_quoted_identifier("Table name", &table, span)?;
        validate_quoted_identifier("Primary key", &primary_key, span)?;

        if !seen_tags.insert(tag.clone()) {
            return Err(Error::new(
                span,
                format!("Resource tag '{}' is used by more than one variant", tag),
            ));
        }

        variants.push(VariantInfo {
            ident: variant.ident.clone(),
            tag,
            table,
            primary_key,
        });
    }

    Ok(variants)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("Users"), "users");
        assert_eq!(kebab_case("OrgRoles"), "org-roles");
        assert_eq!(kebab_case("Snake_case"), "snake-case");
    }

    #[test]
    fn test_defaults_and_overrides() {
        let input: DeriveInput = syn::parse_quote! {
            enum Resource {
                Users,
                #[resource(tag = "org-roles", table = "organization-roles")]
                OrgRoles,
                #[resource(primary_key = "petId")]
                Pets,
            }
        };
        let variants = parse_resource_variants(&input).unwrap();

        assert_eq!(variants[0].tag, "users");
        assert_eq!(variants[0].table, "users");
        assert_eq!(variants[0].primary_key, "id");
        assert_eq!(variants[1].tag, "org-roles");
        assert_eq!(variants[1].table, "organization-roles");
        assert_eq!(variants[2].primary_key, "petId");
    }

    #[test]
    fn test_rejects_duplicate_tags() {
        let input: DeriveInput = syn::parse_quote! {
            enum Resource {
                Users,
                #[resource(tag = "users")]
                People,
            }
        };
        assert!(parse_resource_variants(&input).is_err());
    }

    #[test]
    fn test_rejects_quoted_table() {
        let input: DeriveInput = syn::parse_quote! {
            enum Resource {
                #[resource(table = "users`; DROP")]
                Users,
            }
        };
        assert!(parse_resource_variants(&input).is_err());
    }

    #[test]
    fn test_rejects_data_variants() {
        let input: DeriveInput = syn::parse_quote! {
            enum Resource {
                Users(u8),
            }
        };
        assert!(parse_resource_variants(&input).is_err());
    }
}
