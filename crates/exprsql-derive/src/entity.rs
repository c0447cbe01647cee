//! `#[derive(Entity)]` implementation.

use crate::attrs::{entity_attr, field_attr};
use heck::ToShoutySnakeCase;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity can only be derived for structs",
            ));
        }
    };

    let attr = entity_attr(&input.attrs)?;
    let type_name = name.to_string();
    let table = attr.table.unwrap_or_else(|| type_name.clone());

    let mut mappings = Vec::with_capacity(fields.len());
    let mut consts = Vec::with_capacity(fields.len());

    for field in fields {
        let Some(ident) = &field.ident else {
            continue;
        };
        let member = ident.unraw().to_string();
        let column = match field_attr(&field.attrs)?.column {
            Some(column) => column,
            None => attr.rename_all.apply(&member),
        };
        let const_ident = syn::Ident::new(&member.to_shouty_snake_case(), Span::call_site());
        let doc = format!("`{table}.{column}`");

        mappings.push(quote! { (#member, #column) });
        consts.push(quote! {
            #[doc = #doc]
            pub const #const_ident: ::exprsql::Field<Self> = ::exprsql::Field::new(#member);
        });
    }

    Ok(quote! {
        impl #impl_generics ::exprsql::entity::Entity for #name #ty_generics #where_clause {
            const META: ::exprsql::EntityMeta =
                ::exprsql::EntityMeta::new(#type_name, #table, &[#(#mappings),*]);
        }

        impl #impl_generics #name #ty_generics #where_clause {
            #(#consts)*
        }
    })
}
