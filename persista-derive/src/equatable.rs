//! Implementation of the `#[derive(Equatable)]` macro.
//!
//! This module generates a field-by-field `Equatable::equals` for structs
//! and enums.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{
    Data, DeriveInput, Fields, GenericParam, Generics, Index, Variant, parse_macro_input,
    parse_quote,
};

use crate::attributes;

/// Main implementation of the Equatable derive macro.
pub fn derive_equatable_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let expanded = generate_equatable(&input).unwrap_or_else(syn::Error::into_compile_error);

    TokenStream::from(expanded)
}

fn generate_equatable(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let options = attributes::container_options(&input.attrs)?;

    let (body, generics) = if options.native {
        let mut generics = input.generics.clone();
        generics
            .make_where_clause()
            .predicates
            .push(parse_quote!(Self: ::core::cmp::PartialEq));
        (quote! { ::core::cmp::PartialEq::eq(self, other) }, generics)
    } else {
        let body = match &input.data {
            Data::Struct(data_struct) => generate_struct_body(&data_struct.fields)?,
            Data::Enum(data_enum) => generate_enum_body(&data_enum.variants)?,
            Data::Union(_) => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Equatable cannot be derived for unions.",
                ));
            }
        };
        (body, add_equatable_bounds(input.generics.clone()))
    };

    let (impl_generics, type_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::persista::equality::Equatable for #name #type_generics #where_clause {
            #[inline]
            #[allow(unused_variables, unreachable_patterns)]
            fn equals(&self, other: &Self) -> bool {
                #body
            }
        }
    })
}

/// Adds an `Equatable` bound to every type parameter.
fn add_equatable_bounds(mut generics: Generics) -> Generics {
    for parameter in &mut generics.params {
        if let GenericParam::Type(type_parameter) = parameter {
            type_parameter
                .bounds
                .push(parse_quote!(::persista::equality::Equatable));
        }
    }
    generics
}

fn compare(left: &TokenStream2, right: &TokenStream2) -> TokenStream2 {
    quote! { ::persista::equality::Equatable::equals(#left, #right) }
}

/// Conjunction of all comparisons; an empty list is `true`.
fn conjunction(comparisons: &[TokenStream2]) -> TokenStream2 {
    quote! { #(#comparisons &&)* true }
}

fn generate_struct_body(fields: &Fields) -> syn::Result<TokenStream2> {
    let mut comparisons = Vec::new();

    match fields {
        Fields::Named(named_fields) => {
            for field in &named_fields.named {
                if attributes::is_skipped(field)? {
                    continue;
                }
                let field_name = &field.ident;
                comparisons.push(compare(
                    &quote! { &self.#field_name },
                    &quote! { &other.#field_name },
                ));
            }
        }
        Fields::Unnamed(unnamed_fields) => {
            for (position, field) in unnamed_fields.unnamed.iter().enumerate() {
                if attributes::is_skipped(field)? {
                    continue;
                }
                let index = Index::from(position);
                comparisons.push(compare(&quote! { &self.#index }, &quote! { &other.#index }));
            }
        }
        Fields::Unit => {}
    }

    Ok(conjunction(&comparisons))
}

fn generate_enum_body(variants: &Punctuated<Variant, Comma>) -> syn::Result<TokenStream2> {
    if variants.is_empty() {
        return Ok(quote! { match *self {} });
    }

    let arms = variants
        .iter()
        .map(generate_variant_arm)
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        match (self, other) {
            #(#arms)*
            _ => false,
        }
    })
}

/// Generates the match arm comparing two values of the same variant.
fn generate_variant_arm(variant: &Variant) -> syn::Result<TokenStream2> {
    let variant_name = &variant.ident;
    let mut comparisons = Vec::new();

    let (self_pattern, other_pattern) = match &variant.fields {
        Fields::Unit => (quote! { Self::#variant_name }, quote! { Self::#variant_name }),
        Fields::Named(named_fields) => {
            let mut self_bindings = Vec::new();
            let mut other_bindings = Vec::new();
            for (position, field) in named_fields.named.iter().enumerate() {
                if attributes::is_skipped(field)? {
                    continue;
                }
                let field_name = &field.ident;
                let self_binding = format_ident!("__self_{}", position);
                let other_binding = format_ident!("__other_{}", position);
                comparisons.push(compare(&quote! { #self_binding }, &quote! { #other_binding }));
                self_bindings.push(quote! { #field_name: #self_binding });
                other_bindings.push(quote! { #field_name: #other_binding });
            }
            (
                quote! { Self::#variant_name { #(#self_bindings,)* .. } },
                quote! { Self::#variant_name { #(#other_bindings,)* .. } },
            )
        }
        Fields::Unnamed(unnamed_fields) => {
            let mut self_bindings = Vec::new();
            let mut other_bindings = Vec::new();
            for (position, field) in unnamed_fields.unnamed.iter().enumerate() {
                if attributes::is_skipped(field)? {
                    self_bindings.push(quote! { _ });
                    other_bindings.push(quote! { _ });
                    continue;
                }
                let self_binding = format_ident!("__self_{}", position);
                let other_binding = format_ident!("__other_{}", position);
                comparisons.push(compare(&quote! { #self_binding }, &quote! { #other_binding }));
                self_bindings.push(quote! { #self_binding });
                other_bindings.push(quote! { #other_binding });
            }
            (
                quote! { Self::#variant_name(#(#self_bindings),*) },
                quote! { Self::#variant_name(#(#other_bindings),*) },
            )
        }
    };

    let body = conjunction(&comparisons);

    Ok(quote! {
        (#self_pattern, #other_pattern) => #body,
    })
}
