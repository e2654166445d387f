use proc_macro::TokenStream;

use quote::quote;
use syn::{DeriveInput, Error};

use crate::attr;
use crate::attr::EnumShape;

pub(crate) fn emit(input: &DeriveInput) -> Result<TokenStream, Error> {
    let body = match &input.data {
        syn::Data::Struct(_data) => quote! { emitter.write_object(self) },
        syn::Data::Enum(data) => match attr::enum_shape(data, input)? {
            EnumShape::Polymorphic(subtypes) => {
                let arms = subtypes.iter().map(|subtype| {
                    let variant = subtype.ident;

                    quote! { Self::#variant(inner) => emitter.write_tagged(inner), }
                });

                quote! {
                    match self {
                        #(#arms)*
                    }
                }
            }
            EnumShape::Fieldless(variants) if variants.is_empty() => quote! { match *self {} },
            EnumShape::Fieldless(variants) => {
                let arms = variants.iter().map(|variant| {
                    let variant_str = syn::LitStr::new(
                        format!("{}", variant).as_str(),
                        proc_macro2::Span::call_site(),
                    );

                    quote! { Self::#variant => #variant_str, }
                });

                quote! {
                    emitter.write_str(match self {
                        #(#arms)*
                    })
                }
            }
        },
        syn::Data::Union(_data) => {
            return Err(Error::new_spanned(
                input,
                "union is not supported by Emit",
            ))
        }
    };
    let generics_params = &input.generics.params;
    let where_clause = &input.generics.where_clause;
    let ident = &input.ident;

    Ok(quote! {
        impl<#generics_params> ::jsonmap::Emit for #ident<#generics_params> #where_clause {
            fn emit(&self, emitter: &mut ::jsonmap::Emitter<'_>) {
                #body
            }
        }
    }
    .into())
}
