//! Binding parsed values into typed targets.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::hash::BuildHasher;

use crate::descriptor::eq_ignore_case;
use crate::descriptor::Describe;
use crate::descriptor::Polymorphic;
use crate::error::ConversionError;
use crate::options::Options;
use crate::value::Value;

/// A type that can be built from a parsed [Value].
///
/// Derive it with [derive::Bind](crate::derive::Bind) for records,
/// polymorphic bases and enums.
pub trait Bind: Sized {
    fn bind(value: Value, binder: &Binder<'_>) -> Result<Self, ConversionError>;
}

/// Carries the options in effect while binding a value tree.
#[derive(Clone, Copy, Debug)]
pub struct Binder<'a> {
    options: &'a Options,
}

impl<'a> Binder<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &'a Options {
        self.options
    }

    pub fn bind<T: Bind>(&self, value: Value) -> Result<T, ConversionError> {
        T::bind(value, self)
    }

    /// Binds an object into a default-constructed record.
    ///
    /// Keys are matched against member names ignoring case. Keys
    /// without a member are ignored, as is the discriminator when
    /// type information is in use.
    pub fn bind_object<T: Describe + Default>(&self, value: Value) -> Result<T, ConversionError> {
        let descriptor = T::descriptor();
        let mut entries = match value {
            Value::Object(entries) => entries,
            Value::Null => {
                return Err(ConversionError::UnexpectedNull {
                    type_name: descriptor.name(),
                })
            }
            other => {
                return Err(ConversionError::InvalidType {
                    expected: descriptor.name(),
                    found: other.kind(),
                })
            }
        };

        if self.options.use_type_info {
            entries.remove(&self.options.discriminator_key);
        }

        let mut target = T::default();

        for (key, value) in entries {
            if let Some(member) = descriptor.member(&key) {
                member
                    .set(&mut target, value, self)
                    .map_err(|err| ConversionError::member(descriptor.name(), member.name(), err))?;
            }
        }

        Ok(target)
    }

    /// Binds an object into the subtype its discriminator names.
    ///
    /// Without type information, or when the discriminator is absent
    /// or unknown, the base's fallback subtype is used.
    pub fn bind_polymorphic<E: Polymorphic>(&self, value: Value) -> Result<E, ConversionError> {
        let table = E::subtypes();
        let entries = match value {
            Value::Object(entries) => entries,
            Value::Null => {
                return Err(ConversionError::UnexpectedNull {
                    type_name: table.base(),
                })
            }
            other => {
                return Err(ConversionError::InvalidType {
                    expected: table.base(),
                    found: other.kind(),
                })
            }
        };

        let resolved = if self.options.use_type_info {
            match entries.get(&self.options.discriminator_key) {
                Some(Value::String(name)) if !name.is_empty() => table.resolve(name),
                _ => None,
            }
        } else {
            None
        };

        let index = resolved
            .or(table.fallback())
            .ok_or(ConversionError::MissingConstructor {
                type_name: table.base(),
            })?;

        table.bind(index, Value::Object(entries), self)
    }

    /// Finds the variant of a fieldless enum named by `value`, and
    /// returns its position in `variants`.
    ///
    /// Names match ignoring case. Integers, and strings holding
    /// integers, match by discriminant.
    pub fn bind_variant(
        &self,
        value: Value,
        type_name: &'static str,
        variants: &[(&str, i64)],
    ) -> Result<usize, ConversionError> {
        let by_discriminant = |n: i64, text: String| {
            variants
                .iter()
                .position(|&(_, d)| d == n)
                .ok_or(ConversionError::UnknownVariant {
                    type_name,
                    value: text,
                })
        };

        let text = match value {
            Value::String(s) => s,
            Value::Int32(n) => return by_discriminant(n.into(), n.to_string()),
            Value::Int64(n) => return by_discriminant(n, n.to_string()),
            Value::Null => return Err(ConversionError::UnexpectedNull { type_name }),
            other => {
                return Err(ConversionError::InvalidType {
                    expected: type_name,
                    found: other.kind(),
                })
            }
        };

        let trimmed = text.trim();

        if let Ok(n) = trimmed.parse::<i64>() {
            return by_discriminant(n, text);
        }

        variants
            .iter()
            .position(|&(name, _)| eq_ignore_case(name, trimmed))
            .ok_or(ConversionError::UnknownVariant {
                type_name,
                value: text,
            })
    }
}

impl Bind for Value {
    fn bind(value: Value, _binder: &Binder<'_>) -> Result<Self, ConversionError> {
        Ok(value)
    }
}

impl<T: Bind> Bind for Option<T> {
    fn bind(value: Value, binder: &Binder<'_>) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            value => T::bind(value, binder).map(Some),
        }
    }
}

impl<T: Bind> Bind for Box<T> {
    fn bind(value: Value, binder: &Binder<'_>) -> Result<Self, ConversionError> {
        T::bind(value, binder).map(Box::new)
    }
}

/// Binds a sequence. A lone scalar is taken as a one-element sequence.
fn bind_items<T: Bind>(value: Value, binder: &Binder<'_>) -> Result<Vec<T>, ConversionError> {
    match value {
        Value::Array(items) => items.into_iter().map(|item| T::bind(item, binder)).collect(),
        Value::Null => Err(ConversionError::UnexpectedNull {
            type_name: "sequence",
        }),
        Value::Object(_) => Err(ConversionError::InvalidType {
            expected: "sequence",
            found: "object",
        }),
        scalar => T::bind(scalar, binder).map(|item| vec![item]),
    }
}

impl<T: Bind> Bind for Vec<T> {
    fn bind(value: Value, binder: &Binder<'_>) -> Result<Self, ConversionError> {
        bind_items(value, binder)
    }
}

impl<T: Bind> Bind for VecDeque<T> {
    fn bind(value: Value, binder: &Binder<'_>) -> Result<Self, ConversionError> {
        bind_items(value, binder).map(VecDeque::from)
    }
}

fn bind_entries<V, C>(value: Value, binder: &Binder<'_>) -> Result<C, ConversionError>
where
    V: Bind,
    C: FromIterator<(String, V)>,
{
    match value {
        Value::Object(entries) => entries
            .into_iter()
            .map(|(k, v)| V::bind(v, binder).map(|v| (k, v)))
            .collect(),
        Value::Null => Err(ConversionError::UnexpectedNull { type_name: "map" }),
        other => Err(ConversionError::InvalidType {
            expected: "map",
            found: other.kind(),
        }),
    }
}

impl<V: Bind, S: BuildHasher + Default> Bind for HashMap<String, V, S> {
    fn bind(value: Value, binder: &Binder<'_>) -> Result<Self, ConversionError> {
        bind_entries(value, binder)
    }
}

impl<V: Bind> Bind for BTreeMap<String, V> {
    fn bind(value: Value, binder: &Binder<'_>) -> Result<Self, ConversionError> {
        bind_entries(value, binder)
    }
}
