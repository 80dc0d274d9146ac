//! Pagewire Derive Macros: composite page objects
//!
//! `#[derive(Composite)]` turns a struct of component fields into a page
//! object. Each field becomes one entry of the composite's schema and is
//! wired lazily from the session:
//!
//! ```ignore
//! use pagewire::prelude::*;
//!
//! #[derive(Composite)]
//! #[wire(rename_all = "camelCase")]
//! struct LoginScreen {
//!     // located by "userName"
//!     user_name: Wired<TextField>,
//!     // located by "pwd"
//!     #[wire(id = "pwd")]
//!     password: Wired<TextField>,
//!     // located by "footer" > "login"
//!     #[wire(path("footer", "login"))]
//!     login: Wired<Button>,
//!     // left to Default
//!     #[wire(skip)]
//!     attempts: u32,
//! }
//!
//! let screen: LoginScreen = session.resolve_composite();
//! ```
//!
//! # Attributes
//!
//! - `#[wire(rename_all = "camelCase")]` on the struct: derive stable ids
//!   from field names in camelCase instead of as written
//! - `#[wire(id = "...")]`: locate the field by one stable id
//! - `#[wire(path("a", "b"))]`: locate the field by a stable-id path
//! - `#[wire(skip)]`: not part of the schema; initialized with `Default`

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr, Token};

/// Derive `pagewire::page_object::Composite` for a struct with named fields.
///
/// Every non-skipped field type must implement `pagewire::WireSlot`
/// (`Wired<T>` and `Nested<C>` do).
#[proc_macro_derive(Composite, attributes(wire))]
pub fn derive_composite(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_composite(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_composite(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let schema_name = name.to_string();
    let container = ContainerAttrs::parse(&input.attrs)?;

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            name,
            "Composite can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            name,
            "Composite needs a struct with named fields",
        ));
    };

    let mut decls = Vec::new();
    let mut inits = Vec::new();
    for field in &fields.named {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = FieldAttrs::parse(&field.attrs)?;
        if attrs.skip {
            inits.push(quote! { #ident: ::core::default::Default::default() });
            continue;
        }

        let ty = &field.ty;
        let raw = ident.to_string();
        let raw = raw.strip_prefix("r#").unwrap_or(&raw);
        let field_name = if container.camel_case {
            to_camel_case(raw)
        } else {
            raw.to_string()
        };

        let locate = match (&attrs.id, &attrs.path) {
            (Some(id), _) => quote! { .with_id(#id) },
            (None, Some(path)) => quote! { .with_path([#(#path),*]) },
            (None, None) => quote! {},
        };
        decls.push(quote! {
            ::pagewire::FieldDecl::new(#field_name, <#ty as ::pagewire::WireSlot>::KIND) #locate
        });
        inits.push(quote! { #ident: context.slot(#field_name) });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::pagewire::page_object::Composite for #name #ty_generics #where_clause {
            fn schema() -> ::pagewire::CompositeSchema {
                ::pagewire::CompositeSchema::new(#schema_name)
                    #(.field(#decls))*
            }

            #[allow(unused_variables)]
            fn wire(context: ::pagewire::WireContext) -> Self {
                Self {
                    #(#inits),*
                }
            }
        }
    })
}

// ============================================================================
// Attribute parsing
// ============================================================================

#[derive(Default)]
struct ContainerAttrs {
    camel_case: bool,
}

impl ContainerAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("wire")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    let rule: LitStr = meta.value()?.parse()?;
                    match rule.value().as_str() {
                        "camelCase" => out.camel_case = true,
                        "none" => out.camel_case = false,
                        _ => {
                            return Err(syn::Error::new_spanned(
                                rule,
                                "supported rename rules: \"camelCase\", \"none\"",
                            ))
                        }
                    }
                    Ok(())
                } else {
                    Err(meta.error("unknown container attribute; expected rename_all"))
                }
            })?;
        }
        Ok(out)
    }
}

#[derive(Default)]
struct FieldAttrs {
    id: Option<LitStr>,
    path: Option<Vec<LitStr>>,
    skip: bool,
}

impl FieldAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("wire")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    out.id = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("path") {
                    let content;
                    syn::parenthesized!(content in meta.input);
                    let segments: Punctuated<LitStr, Token![,]> =
                        content.parse_terminated(<LitStr as syn::parse::Parse>::parse, Token![,])?;
                    if segments.is_empty() {
                        return Err(meta.error("path needs at least one segment"));
                    }
                    out.path = Some(segments.into_iter().collect());
                } else if meta.path.is_ident("skip") {
                    out.skip = true;
                } else {
                    return Err(meta.error("unknown field attribute; expected id, path or skip"));
                }
                Ok(())
            })?;
            if out.id.is_some() && out.path.is_some() {
                return Err(syn::Error::new_spanned(
                    attr,
                    "use either id or path, not both",
                ));
            }
        }
        Ok(out)
    }
}

/// Convert snake_case to camelCase
fn to_camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut upper_next = false;

    for c in s.chars() {
        if c == '_' {
            upper_next = !result.is_empty();
        } else if upper_next {
            result.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            result.push(c);
        }
    }

    result
}
