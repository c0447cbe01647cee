//! `#[derive(SqlEnum)]` implementation.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    let variants = match &input.data {
        Data::Enum(e) => &e.variants,
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "SqlEnum can only be derived for enums",
            ));
        }
    };

    let mut name_arms = Vec::with_capacity(variants.len());
    for variant in variants {
        if !matches!(&variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "SqlEnum variants must be unit variants (no fields)",
            ));
        }
        let variant_ident = &variant.ident;
        let variant_name = variant_ident.to_string();
        name_arms.push(quote! {
            #name::#variant_ident => #variant_name,
        });
    }

    let type_name = name.to_string();

    Ok(quote! {
        impl ::exprsql::value::SqlEnum for #name {
            const TYPE_NAME: &'static str = #type_name;

            fn discriminant(self) -> i64 {
                self as i64
            }

            fn variant_name(self) -> &'static str {
                match self {
                    #(#name_arms)*
                }
            }
        }

        impl ::std::convert::From<#name> for ::exprsql::Value {
            fn from(v: #name) -> Self {
                ::exprsql::Value::Int(::exprsql::value::SqlEnum::discriminant(v))
            }
        }

        impl ::std::convert::From<#name> for ::exprsql::Expr {
            fn from(v: #name) -> Self {
                ::exprsql::Expr::enum_const(v)
            }
        }
    })
}
