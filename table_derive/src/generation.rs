//! Code generation for the `ResourceKind` trait

use proc_macro2::TokenStream;
use quote::quote;
use syn::Ident;

use crate::parsing::VariantInfo;

pub fn generate_resource_kind_impl(name: &Ident, variants: &[VariantInfo]) -> TokenStream {
    let idents: Vec<_> = variants.iter().map(|v| &v.ident).collect();
    let tags: Vec<_> = variants.iter().map(|v| v.tag.as_str()).collect();
    let tables: Vec<_> = variants.iter().map(|v| v.table.as_str()).collect();
    let primary_keys: Vec<_> = variants.iter().map(|v| v.primary_key.as_str()).collect();

    quote! {
        impl store_object::ResourceKind for #name {
            fn tag(&self) -> &'static str {
                match self {
                    #( #name::#idents => #tags, )*
                }
            }

            fn table(&self) -> &'static str {
                match self {
                    #( #name::#idents => #tables, )*
                }
            }

            fn primary_key(&self) -> &'static str {
                match self {
                    #( #name::#idents => #primary_keys, )*
                }
            }

            fn all() -> &'static [Self] {
                &[ #( #name::#idents, )* ]
            }
        }

        impl ::std::fmt::Display for #name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(<Self as store_object::ResourceKind>::tag(self))
            }
        }
    }
}
