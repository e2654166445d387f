use proc_macro::TokenStream;

use quote::quote;
use syn::{DeriveInput, Error};

use crate::attr;
use crate::attr::EnumShape;

pub(crate) fn describe(input: &DeriveInput) -> Result<TokenStream, Error> {
    match &input.data {
        syn::Data::Struct(data) => describe_struct(data, input),
        syn::Data::Enum(data) => match attr::enum_shape(data, input)? {
            EnumShape::Polymorphic(subtypes) => describe_polymorphic(&subtypes, input),
            EnumShape::Fieldless(_) => Err(Error::new_spanned(
                input,
                "fieldless enums only need Bind and Emit",
            )),
        },
        syn::Data::Union(_data) => Err(Error::new_spanned(
            input,
            "union is not supported by Describe",
        )),
    }
}

fn describe_struct(data: &syn::DataStruct, input: &DeriveInput) -> Result<TokenStream, Error> {
    let generics_params = &input.generics.params;
    let where_clause = &input.generics.where_clause;
    let ident = &input.ident;
    let name_str = syn::LitStr::new(
        format!("{}", ident).as_str(),
        proc_macro2::Span::call_site(),
    );
    let tagged = attr::container_attrs(&input.attrs)?.tagged;
    let fields = match &data.fields {
        syn::Fields::Named(fields) => fields,
        _ => {
            return Err(Error::new_spanned(
                input,
                "Describe needs a struct with named fields",
            ))
        }
    };
    let members = fields
        .named
        .iter()
        .map(describe_field)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(quote! {
        impl<#generics_params> ::jsonmap::Describe for #ident<#generics_params> #where_clause {
            fn descriptor() -> &'static ::jsonmap::TypeDescriptor<Self> {
                ::jsonmap::registry::cached(|| {
                    #[allow(unused_variables)]
                    let defaults: Self = ::std::default::Default::default();

                    ::jsonmap::TypeDescriptor::builder(#name_str)
                        .tagged(#tagged)
                        #(#members)*
                        .build()
                })
            }
        }
    }
    .into())
}

fn describe_field(field: &syn::Field) -> Result<proc_macro2::TokenStream, Error> {
    let attrs = attr::field_attrs(&field.attrs)?;

    if attrs.skip {
        return Ok(quote! {});
    }

    let ident = field.ident.as_ref().unwrap();
    let ty = &field.ty;
    let name_str = syn::LitStr::new(
        attrs
            .rename
            .unwrap_or_else(|| attr::camel_case(ident))
            .as_str(),
        proc_macro2::Span::call_site(),
    );
    let default = match attrs.default {
        Some(expr) => quote! { #expr },
        None => quote! { defaults.#ident },
    };

    Ok(quote! {
        .member::<#ty>(
            #name_str,
            |v: &Self| &v.#ident,
            |v: &mut Self| &mut v.#ident,
            #default,
        )
    })
}

fn describe_polymorphic(
    subtypes: &[attr::Subtype<'_>],
    input: &DeriveInput,
) -> Result<TokenStream, Error> {
    let generics_params = &input.generics.params;
    let where_clause = &input.generics.where_clause;
    let ident = &input.ident;
    let name_str = syn::LitStr::new(
        format!("{}", ident).as_str(),
        proc_macro2::Span::call_site(),
    );
    let adds = subtypes
        .iter()
        .map(|subtype| {
            let variant = subtype.ident;
            let ty = subtype.ty;

            if subtype.fallback {
                quote! { .fallback::<#ty>(Self::#variant) }
            } else {
                quote! { .subtype::<#ty>(Self::#variant) }
            }
        })
        .collect::<Vec<_>>();

    Ok(quote! {
        impl<#generics_params> ::jsonmap::Polymorphic for #ident<#generics_params> #where_clause {
            fn subtypes() -> &'static ::jsonmap::SubtypeTable<Self> {
                ::jsonmap::registry::cached(|| {
                    ::jsonmap::SubtypeTable::builder(#name_str)
                        #(#adds)*
                        .build()
                })
            }
        }
    }
    .into())
}
