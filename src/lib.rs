//! jsonmap maps JSON-like text to Rust types and back, through a
//! dynamic [Value] tree as the intermediate representation.
//!
//! Reading happens in two steps. The [parser] turns text into a
//! [Value], then a [Binder] converts the value into a target type
//! implementing [Bind]. Writing goes straight from a type
//! implementing [Emit] to text.
//!
//! The default grammar is lenient: strings and keys may be unquoted
//! or single-quoted, so `{firstName: 'Ivan'}` parses. Standard JSON
//! can be required with [Options::strict].
//!
//! Record types describe their members through a [TypeDescriptor],
//! usually derived:
//!
//! ```
//! use jsonmap::derive::{Bind, Describe, Emit};
//! use jsonmap::Options;
//!
//! #[derive(Bind, Debug, Default, Describe, Emit, PartialEq)]
//! struct Person {
//!     id: i64,
//!     first_name: Option<String>,
//! }
//!
//! let options = Options::default();
//! let person: Person = jsonmap::deserialize("{ID: 7, firstname: 'Ivan'}", &options).unwrap();
//!
//! assert_eq!(person, Person { id: 7, first_name: Some("Ivan".to_owned()) });
//! assert_eq!(jsonmap::serialize(&person, &options), r#"{"firstName":"Ivan","id":7}"#);
//! ```
//!
//! Member names match ignoring case when binding, and members equal
//! to their default are left out when emitting.
//!
//! ## Polymorphism
//!
//! An enum whose variants each wrap one described struct is a
//! polymorphic base. With [Options::use_type_info], objects carry a
//! discriminator (`"@type"` by default) naming the concrete type,
//! which selects the variant when binding. A variant marked
//! `#[jsonmap(fallback)]` is used when there is no usable
//! discriminator.

// Lets the derives' `::jsonmap` paths resolve inside this crate.
extern crate self as jsonmap;

pub mod derive {
    pub use jsonmap_derive::{Bind, Describe, Emit};
}

mod bind;
pub use bind::Bind;
pub use bind::Binder;

mod convert;

mod descriptor;
pub use descriptor::Describe;
pub use descriptor::MemberDescriptor;
pub use descriptor::Polymorphic;
pub use descriptor::SubtypeTable;
pub use descriptor::SubtypeTableBuilder;
pub use descriptor::TypeDescriptor;
pub use descriptor::TypeDescriptorBuilder;

mod emit;
pub use emit::Emit;
pub use emit::Emitter;

mod error;
pub use error::ConversionError;
pub use error::Error;
pub use error::ParseError;

mod options;
pub use options::Options;
pub use options::DEFAULT_DISCRIMINATOR_KEY;

pub mod parser;
pub use parser::parse;
pub use parser::Parser;

pub mod registry;

mod value;
pub use value::Value;

/// Writes `value` as JSON text.
pub fn serialize<T: Emit + ?Sized>(value: &T, options: &Options) -> String {
    let mut emitter = Emitter::new(options);

    value.emit(&mut emitter);
    emitter.into_string()
}

/// Parses `text` and binds the result into `T`.
pub fn deserialize<T: Bind>(text: &str, options: &Options) -> Result<T, Error> {
    let value = Parser::new(text)
        .collect_line_info(options.collect_line_info)
        .strict(options.strict)
        .parse()?;

    Ok(bind(value, options)?)
}

/// Binds an already parsed value into `T`.
pub fn bind<T: Bind>(value: Value, options: &Options) -> Result<T, ConversionError> {
    Binder::new(options).bind(value)
}
