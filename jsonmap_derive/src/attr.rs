use syn::ext::IdentExt as _;
use syn::{DeriveInput, Error};

#[derive(Default)]
pub(crate) struct ContainerAttrs {
    pub tagged: bool,
}

#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub rename: Option<String>,
    pub default: Option<syn::Expr>,
    pub skip: bool,
}

#[derive(Default)]
pub(crate) struct VariantAttrs {
    pub fallback: bool,
}

fn jsonmap_attrs(attrs: &[syn::Attribute]) -> impl Iterator<Item = &syn::Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident("jsonmap"))
}

pub(crate) fn container_attrs(attrs: &[syn::Attribute]) -> Result<ContainerAttrs, Error> {
    let mut out = ContainerAttrs::default();

    for attr in jsonmap_attrs(attrs) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("tagged") {
                out.tagged = true;
                Ok(())
            } else {
                Err(meta.error("unsupported jsonmap struct attribute"))
            }
        })?;
    }

    Ok(out)
}

pub(crate) fn field_attrs(attrs: &[syn::Attribute]) -> Result<FieldAttrs, Error> {
    let mut out = FieldAttrs::default();

    for attr in jsonmap_attrs(attrs) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let name: syn::LitStr = meta.value()?.parse()?;
                out.rename = Some(name.value());
                Ok(())
            } else if meta.path.is_ident("default") {
                out.default = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("skip") {
                out.skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported jsonmap field attribute"))
            }
        })?;
    }

    Ok(out)
}

pub(crate) fn variant_attrs(attrs: &[syn::Attribute]) -> Result<VariantAttrs, Error> {
    let mut out = VariantAttrs::default();

    for attr in jsonmap_attrs(attrs) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("fallback") {
                out.fallback = true;
                Ok(())
            } else {
                Err(meta.error("unsupported jsonmap variant attribute"))
            }
        })?;
    }

    Ok(out)
}

/// Turns a snake_case field name into camelCase.
pub(crate) fn camel_case(ident: &syn::Ident) -> String {
    let name = ident.unraw().to_string();
    let mut out = String::with_capacity(name.len());
    let mut upper = false;

    for c in name.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }

    out
}

/// A variant wrapping exactly one type.
pub(crate) struct Subtype<'a> {
    pub ident: &'a syn::Ident,
    pub ty: &'a syn::Type,
    pub fallback: bool,
}

/// The enum layouts the derives understand.
pub(crate) enum EnumShape<'a> {
    /// All variants are units.
    Fieldless(Vec<&'a syn::Ident>),

    /// All variants wrap one described type.
    Polymorphic(Vec<Subtype<'a>>),
}

pub(crate) fn enum_shape<'a>(
    data: &'a syn::DataEnum,
    input: &DeriveInput,
) -> Result<EnumShape<'a>, Error> {
    if data
        .variants
        .iter()
        .all(|v| matches!(v.fields, syn::Fields::Unit))
    {
        return Ok(EnumShape::Fieldless(
            data.variants.iter().map(|v| &v.ident).collect(),
        ));
    }

    let mut subtypes = Vec::new();

    for variant in &data.variants {
        let ty = match &variant.fields {
            syn::Fields::Unnamed(fields) if fields.unnamed.len() == 1 => &fields.unnamed[0].ty,
            _ => {
                return Err(Error::new_spanned(
                    variant,
                    "variants must either all be units or all wrap exactly one type",
                ))
            }
        };

        subtypes.push(Subtype {
            ident: &variant.ident,
            ty,
            fallback: variant_attrs(&variant.attrs)?.fallback,
        });
    }

    if subtypes.iter().filter(|s| s.fallback).count() > 1 {
        return Err(Error::new_spanned(
            input,
            "at most one variant can be the fallback",
        ));
    }

    Ok(EnumShape::Polymorphic(subtypes))
}
