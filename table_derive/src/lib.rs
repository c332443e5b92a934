//! Procedural macros for declaring resource types
//!
//! This crate provides the `ResourceKind` derive, which turns a fieldless enum into the
//! closed set of resource types a store serves. Each variant maps to a tag, a table and a
//! primary-key column.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod generation;
mod parsing;

use generation::generate_resource_kind_impl;
use parsing::parse_resource_variants;

/// Derive macro for the `ResourceKind` trait
///
/// Every variant must be a unit variant. Defaults: the tag is the kebab-cased variant
/// name, the table is the tag, and the primary key is `id`.
///
/// ```rust,ignore
/// use resourcehaus::prelude::*;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ResourceKind)]
/// pub enum Resource {
///     Users,
///     Addresses,
///     #[resource(tag = "org-roles", table = "organization-roles")]
///     OrgRoles,
///     #[resource(primary_key = "petId")]
///     Pets,
/// }
/// ```
#[proc_macro_derive(ResourceKind, attributes(resource))]
pub fn derive_resource_kind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    // Parse variant attributes - handle errors properly
    let variants = match parse_resource_variants(&input) {
        Ok(variants) => variants,
        Err(e) => return e.to_compile_error().into(),
    };

    TokenStream::from(generate_resource_kind_impl(name, &variants))
}
