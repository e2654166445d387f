use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod attr;
mod bind;
mod describe;
mod emit;

/// Provides `Describe` for a struct with named fields, or
/// `Polymorphic` for an enum whose variants each wrap one described
/// struct.
///
/// Struct attributes:
///
/// * `#[jsonmap(tagged)]` writes the discriminator whenever type
///   information is in use.
///
/// Field attributes:
///
/// * `#[jsonmap(rename = "name")]` sets the external name. It
///   defaults to the field name in camelCase.
/// * `#[jsonmap(default = expr)]` sets the value left out when
///   emitting. It defaults to the field's value in
///   `Default::default()`.
/// * `#[jsonmap(skip)]` leaves the field out entirely.
///
/// Variant attributes:
///
/// * `#[jsonmap(fallback)]` binds objects without a resolvable
///   discriminator into this variant.
#[proc_macro_derive(Describe, attributes(jsonmap))]
pub fn derive_describe(tokens: TokenStream) -> TokenStream {
    let input = parse_macro_input!(tokens as DeriveInput);

    match describe::describe(&input) {
        Ok(output) => output,
        Err(err) => err.into_compile_error().into(),
    }
}

/// Provides `Bind` for a described struct, a polymorphic enum, or a
/// fieldless enum.
#[proc_macro_derive(Bind, attributes(jsonmap))]
pub fn derive_bind(tokens: TokenStream) -> TokenStream {
    let input = parse_macro_input!(tokens as DeriveInput);

    match bind::bind(&input) {
        Ok(output) => output,
        Err(err) => err.into_compile_error().into(),
    }
}

/// Provides `Emit` for a described struct, a polymorphic enum, or a
/// fieldless enum.
#[proc_macro_derive(Emit, attributes(jsonmap))]
pub fn derive_emit(tokens: TokenStream) -> TokenStream {
    let input = parse_macro_input!(tokens as DeriveInput);

    match emit::emit(&input) {
        Ok(output) => output,
        Err(err) => err.into_compile_error().into(),
    }
}
