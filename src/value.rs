//! The value tree produced by the parser.

use std::collections::HashMap;

use rust_decimal::Decimal;

/// Any parsed JSON-like value.
///
/// Numbers keep the narrowest representation the parser could find
/// for the literal: [Int32](Value::Int32), then
/// [Int64](Value::Int64) for integers, and
/// [Decimal](Value::Decimal), then [Double](Value::Double) for
/// fractional or exponent literals.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Decimal(Decimal),
    Double(f64),
    String(String),
    Array(Vec<Value>),

    /// Keys are case-sensitive and unique. The last write wins.
    Object(HashMap<String, Value>),
}

impl Value {
    /// A short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::Decimal(_) => "decimal",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Self::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Looks up an object entry by exact key. Returns `None` for
    /// anything but an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|entries| entries.get(key))
    }
}

macro_rules! value_from [
    ($($id:ident => $ty:ty),*$(,)?) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$id(v.into())
            }
        })*
    };
];

value_from![
    Bool => bool,
    Int32 => i32,
    Int64 => i64,
    Decimal => Decimal,
    Double => f64,
    String => String,
    String => &str,
    Array => Vec<Value>,
    Object => HashMap<String, Value>,
];
