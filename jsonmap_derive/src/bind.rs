use proc_macro::TokenStream;

use quote::quote;
use syn::{DeriveInput, Error};

use crate::attr;
use crate::attr::EnumShape;

pub(crate) fn bind(input: &DeriveInput) -> Result<TokenStream, Error> {
    let body = match &input.data {
        syn::Data::Struct(_data) => quote! { binder.bind_object::<Self>(value) },
        syn::Data::Enum(data) => match attr::enum_shape(data, input)? {
            EnumShape::Polymorphic(_) => quote! { binder.bind_polymorphic::<Self>(value) },
            EnumShape::Fieldless(variants) => bind_fieldless(&variants, input),
        },
        syn::Data::Union(_data) => {
            return Err(Error::new_spanned(
                input,
                "union is not supported by Bind",
            ))
        }
    };
    let generics_params = &input.generics.params;
    let where_clause = &input.generics.where_clause;
    let ident = &input.ident;

    Ok(quote! {
        impl<#generics_params> ::jsonmap::Bind for #ident<#generics_params> #where_clause {
            fn bind(
                value: ::jsonmap::Value,
                binder: &::jsonmap::Binder<'_>,
            ) -> ::std::result::Result<Self, ::jsonmap::ConversionError> {
                #body
            }
        }
    }
    .into())
}

fn bind_fieldless(variants: &[&syn::Ident], input: &DeriveInput) -> proc_macro2::TokenStream {
    let ident = &input.ident;
    let name_str = syn::LitStr::new(
        format!("{}", ident).as_str(),
        proc_macro2::Span::call_site(),
    );
    let entries = variants.iter().map(|variant| {
        let variant_str = syn::LitStr::new(
            format!("{}", variant).as_str(),
            proc_macro2::Span::call_site(),
        );

        quote! { (#variant_str, #ident::#variant as i64) }
    });
    let arms = variants.iter().enumerate().map(|(i, variant)| {
        quote! { #i => ::std::result::Result::Ok(Self::#variant), }
    });

    quote! {
        const VARIANTS: &[(&str, i64)] = &[#(#entries),*];

        match binder.bind_variant(value, #name_str, VARIANTS)? {
            #(#arms)*
            _ => unreachable!("variant index out of range"),
        }
    }
}
