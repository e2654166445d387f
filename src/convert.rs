//! Scalar conversions applied when binding into primitive targets.
//!
//! A value already holding the target's representation passes
//! through. Otherwise numbers convert between each other with
//! half-to-even rounding into integers, strings are trimmed and
//! parsed, and booleans count as 1 and 0.

use std::num::IntErrorKind;
use std::num::ParseIntError;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive as _;
use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;

use crate::bind::Bind;
use crate::bind::Binder;
use crate::emit::format_f64;
use crate::error::ConversionError;
use crate::value::Value;

fn invalid_type(expected: &'static str, value: &Value) -> ConversionError {
    ConversionError::InvalidType {
        expected,
        found: value.kind(),
    }
}

fn invalid_format(type_name: &'static str, value: &str) -> ConversionError {
    ConversionError::InvalidFormat {
        type_name,
        value: value.to_owned(),
    }
}

fn out_of_range(type_name: &'static str, value: impl ToString) -> ConversionError {
    ConversionError::OutOfRange {
        type_name,
        value: value.to_string(),
    }
}

/// Parses decimal text, accepting an exponent.
pub(crate) fn parse_decimal(s: &str) -> Option<Decimal> {
    if s.contains(['e', 'E']) {
        Decimal::from_scientific(s).ok()
    } else {
        Decimal::from_str(s).ok()
    }
}

/// Parses integer text straight into the target type, so the whole
/// range of `u128` is accepted.
fn parse_integer<T: FromStr<Err = ParseIntError>>(
    s: &str,
    type_name: &'static str,
) -> Result<T, ConversionError> {
    let t = s.trim();

    t.parse::<T>().map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => out_of_range(type_name, t),
        // A negative number for an unsigned type.
        _ if t.parse::<i128>().is_ok() => out_of_range(type_name, t),
        _ => invalid_format(type_name, s),
    })
}

fn integer(value: Value, type_name: &'static str) -> Result<i128, ConversionError> {
    match value {
        Value::Int32(n) => Ok(n.into()),
        Value::Int64(n) => Ok(n.into()),
        Value::Bool(b) => Ok(b.into()),
        Value::Decimal(d) => d
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            .to_i128()
            .ok_or_else(|| out_of_range(type_name, d)),
        Value::Double(f) => {
            let n = f.round_ties_even();

            // i128::MAX as f64 rounds up to 2^127, which is out of range.
            if n >= i128::MIN as f64 && n < i128::MAX as f64 {
                Ok(n as i128)
            } else {
                Err(out_of_range(type_name, format_f64(f)))
            }
        }
        Value::Null => Err(ConversionError::UnexpectedNull { type_name }),
        other => Err(invalid_type(type_name, &other)),
    }
}

macro_rules! bind_integer [
    ($($ty:ty),*$(,)?) => {
        $(impl Bind for $ty {
            fn bind(value: Value, _binder: &Binder<'_>) -> Result<Self, ConversionError> {
                if let Value::String(s) = &value {
                    return parse_integer(s, stringify!($ty));
                }

                let n = integer(value, stringify!($ty))?;

                <$ty>::try_from(n).map_err(|_| out_of_range(stringify!($ty), n))
            }
        })*
    };
];

bind_integer![i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize];

fn float(value: Value, type_name: &'static str) -> Result<f64, ConversionError> {
    match value {
        Value::Double(f) => Ok(f),
        Value::Int32(n) => Ok(n.into()),
        Value::Int64(n) => Ok(n as f64),
        Value::Decimal(d) => d.to_f64().ok_or_else(|| out_of_range(type_name, d)),
        Value::Bool(b) => Ok(if b { 1.0 } else { 0.0 }),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid_format(type_name, &s)),
        Value::Null => Err(ConversionError::UnexpectedNull { type_name }),
        other => Err(invalid_type(type_name, &other)),
    }
}

impl Bind for f64 {
    fn bind(value: Value, _binder: &Binder<'_>) -> Result<Self, ConversionError> {
        float(value, "f64")
    }
}

impl Bind for f32 {
    fn bind(value: Value, _binder: &Binder<'_>) -> Result<Self, ConversionError> {
        let f = float(value, "f32")?;

        if f.is_finite() && f.abs() > f32::MAX as f64 {
            return Err(out_of_range("f32", format_f64(f)));
        }

        Ok(f as f32)
    }
}

impl Bind for Decimal {
    fn bind(value: Value, _binder: &Binder<'_>) -> Result<Self, ConversionError> {
        const NAME: &str = "decimal";

        match value {
            Value::Decimal(d) => Ok(d),
            Value::Int32(n) => Ok(n.into()),
            Value::Int64(n) => Ok(n.into()),
            Value::Double(f) => Decimal::try_from(f).map_err(|_| out_of_range(NAME, format_f64(f))),
            Value::Bool(b) => Ok(if b { Decimal::ONE } else { Decimal::ZERO }),
            Value::String(s) => parse_decimal(s.trim()).ok_or_else(|| invalid_format(NAME, &s)),
            Value::Null => Err(ConversionError::UnexpectedNull { type_name: NAME }),
            other => Err(invalid_type(NAME, &other)),
        }
    }
}

impl Bind for bool {
    fn bind(value: Value, _binder: &Binder<'_>) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::Int32(n) => Ok(n != 0),
            Value::Int64(n) => Ok(n != 0),
            Value::Decimal(d) => Ok(!d.is_zero()),
            Value::Double(f) => Ok(f != 0.0),
            Value::String(s) => {
                let t = s.trim();

                if t.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if t.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    Err(invalid_format("bool", &s))
                }
            }
            Value::Null => Err(ConversionError::UnexpectedNull { type_name: "bool" }),
            other => Err(invalid_type("bool", &other)),
        }
    }
}

impl Bind for String {
    fn bind(value: Value, _binder: &Binder<'_>) -> Result<Self, ConversionError> {
        match value {
            Value::String(s) => Ok(s),
            Value::Int32(n) => Ok(n.to_string()),
            Value::Int64(n) => Ok(n.to_string()),
            Value::Decimal(d) => Ok(d.to_string()),
            Value::Double(f) => Ok(format_f64(f)),
            Value::Bool(true) => Ok("True".to_owned()),
            Value::Bool(false) => Ok("False".to_owned()),
            Value::Null => Err(ConversionError::UnexpectedNull { type_name: "String" }),
            other => Err(invalid_type("String", &other)),
        }
    }
}

impl Bind for char {
    fn bind(value: Value, _binder: &Binder<'_>) -> Result<Self, ConversionError> {
        let code = match value {
            Value::String(s) => {
                let mut chars = s.chars();

                return match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(invalid_format("char", &s)),
                };
            }
            Value::Int32(n) => i64::from(n),
            Value::Int64(n) => n,
            Value::Null => return Err(ConversionError::UnexpectedNull { type_name: "char" }),
            other => return Err(invalid_type("char", &other)),
        };

        u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| out_of_range("char", code))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::options::Options;

    fn bind<T: Bind>(value: Value) -> Result<T, ConversionError> {
        let options = Options::default();

        Binder::new(&options).bind(value)
    }

    #[test]
    fn test_integers() {
        let cases = vec![
            (Value::Int32(5), Ok(5)),
            (Value::Int64(-5), Ok(-5)),
            (Value::Double(2.5), Ok(2)),
            (Value::Double(3.5), Ok(4)),
            (Value::Double(-2.5), Ok(-2)),
            (Value::Decimal(Decimal::new(25, 1)), Ok(2)),
            (Value::Decimal(Decimal::new(35, 1)), Ok(4)),
            (Value::from(" 42 "), Ok(42)),
            (Value::Bool(true), Ok(1)),
            (Value::Bool(false), Ok(0)),
            (
                Value::from("x"),
                Err(ConversionError::InvalidFormat {
                    type_name: "i32",
                    value: "x".to_owned(),
                }),
            ),
            (
                Value::Int64(1 << 40),
                Err(ConversionError::OutOfRange {
                    type_name: "i32",
                    value: (1i64 << 40).to_string(),
                }),
            ),
            (
                Value::Null,
                Err(ConversionError::UnexpectedNull { type_name: "i32" }),
            ),
            (
                Value::Array(vec![]),
                Err(ConversionError::InvalidType {
                    expected: "i32",
                    found: "array",
                }),
            ),
        ];

        for (value, want) in cases {
            assert_eq!(bind::<i32>(value.clone()), want, "{value:?}");
        }
    }

    #[test]
    fn test_unsigned() {
        assert_eq!(bind::<u8>(Value::Int32(255)), Ok(255));
        assert_eq!(
            bind::<u8>(Value::Int32(-1)),
            Err(ConversionError::OutOfRange {
                type_name: "u8",
                value: "-1".to_owned(),
            })
        );
        assert_eq!(bind::<u64>(Value::from("18446744073709551615")), Ok(u64::MAX));

        let cases = vec![
            (
                Value::from("340282366920938463463374607431768211455"),
                Ok(u128::MAX),
            ),
            (Value::from(" 7 "), Ok(7)),
            (Value::Double(2f64.powi(100)), Ok(1u128 << 100)),
            (
                Value::Double(3e38),
                Err(ConversionError::OutOfRange {
                    type_name: "u128",
                    value: "3e38".to_owned(),
                }),
            ),
            (
                Value::from("340282366920938463463374607431768211456"),
                Err(ConversionError::OutOfRange {
                    type_name: "u128",
                    value: "340282366920938463463374607431768211456".to_owned(),
                }),
            ),
            (
                Value::from("-1"),
                Err(ConversionError::OutOfRange {
                    type_name: "u128",
                    value: "-1".to_owned(),
                }),
            ),
            (
                Value::from("1.5"),
                Err(ConversionError::InvalidFormat {
                    type_name: "u128",
                    value: "1.5".to_owned(),
                }),
            ),
        ];

        for (value, want) in cases {
            assert_eq!(bind::<u128>(value.clone()), want, "{value:?}");
        }
    }

    #[test]
    fn test_integers_from_large_floats() {
        let cases = vec![
            (Value::Double(9e18), Ok(9_000_000_000_000_000_000)),
            (
                Value::Double(1e300),
                Err(ConversionError::OutOfRange {
                    type_name: "i64",
                    value: "1e300".to_owned(),
                }),
            ),
            (
                Value::Double(-1e300),
                Err(ConversionError::OutOfRange {
                    type_name: "i64",
                    value: "-1e300".to_owned(),
                }),
            ),
            (
                Value::Double(f64::INFINITY),
                Err(ConversionError::OutOfRange {
                    type_name: "i64",
                    value: "Infinity".to_owned(),
                }),
            ),
            (
                Value::Double(f64::NAN),
                Err(ConversionError::OutOfRange {
                    type_name: "i64",
                    value: "NaN".to_owned(),
                }),
            ),
        ];

        for (value, want) in cases {
            assert_eq!(bind::<i64>(value.clone()), want, "{value:?}");
        }
    }

    #[test]
    fn test_floats() {
        let cases = vec![
            (Value::Double(1.5), Ok(1.5)),
            (Value::Int32(3), Ok(3.0)),
            (Value::Int64(1 << 40), Ok((1i64 << 40) as f64)),
            (Value::Decimal(Decimal::new(125, 2)), Ok(1.25)),
            (Value::from("2.5e3"), Ok(2500.0)),
            (
                Value::from("abc"),
                Err(ConversionError::InvalidFormat {
                    type_name: "f64",
                    value: "abc".to_owned(),
                }),
            ),
        ];

        for (value, want) in cases {
            assert_eq!(bind::<f64>(value.clone()), want, "{value:?}");
        }

        assert_eq!(bind::<f32>(Value::Double(0.5)), Ok(0.5f32));
        assert!(bind::<f32>(Value::Double(1e300)).is_err());
    }

    #[test]
    fn test_decimal() {
        let cases = vec![
            (Value::Decimal(Decimal::new(15, 1)), Ok(Decimal::new(15, 1))),
            (Value::Int32(7), Ok(Decimal::new(7, 0))),
            (Value::Int64(-7), Ok(Decimal::new(-7, 0))),
            (Value::from("1.25"), Ok(Decimal::new(125, 2))),
            (Value::from("1.5e2"), Ok(Decimal::new(150, 0))),
            (Value::Bool(true), Ok(Decimal::ONE)),
            (
                Value::from("x"),
                Err(ConversionError::InvalidFormat {
                    type_name: "decimal",
                    value: "x".to_owned(),
                }),
            ),
        ];

        for (value, want) in cases {
            assert_eq!(bind::<Decimal>(value.clone()), want, "{value:?}");
        }
    }

    #[test]
    fn test_bool() {
        let cases = vec![
            (Value::Bool(true), Ok(true)),
            (Value::from("TRUE"), Ok(true)),
            (Value::from("false"), Ok(false)),
            (Value::Int32(0), Ok(false)),
            (Value::Int32(2), Ok(true)),
            (Value::Double(0.0), Ok(false)),
            (
                Value::from("yes"),
                Err(ConversionError::InvalidFormat {
                    type_name: "bool",
                    value: "yes".to_owned(),
                }),
            ),
        ];

        for (value, want) in cases {
            assert_eq!(bind::<bool>(value.clone()), want, "{value:?}");
        }
    }

    #[test]
    fn test_string() {
        let cases = vec![
            (Value::from("a"), Ok("a".to_owned())),
            (Value::Int32(12), Ok("12".to_owned())),
            (Value::Int64(1 << 40), Ok("1099511627776".to_owned())),
            (Value::Decimal(Decimal::new(150, 2)), Ok("1.50".to_owned())),
            (Value::Double(0.25), Ok("0.25".to_owned())),
            (Value::Bool(true), Ok("True".to_owned())),
            (
                Value::Object(HashMap::new()),
                Err(ConversionError::InvalidType {
                    expected: "String",
                    found: "object",
                }),
            ),
        ];

        for (value, want) in cases {
            assert_eq!(bind::<String>(value.clone()), want, "{value:?}");
        }
    }

    #[test]
    fn test_char() {
        let cases = vec![
            (Value::from("x"), Ok('x')),
            (Value::from("é"), Ok('é')),
            (Value::Int32(65), Ok('A')),
            (
                Value::from("xy"),
                Err(ConversionError::InvalidFormat {
                    type_name: "char",
                    value: "xy".to_owned(),
                }),
            ),
            (
                Value::from(""),
                Err(ConversionError::InvalidFormat {
                    type_name: "char",
                    value: "".to_owned(),
                }),
            ),
            (
                Value::Int32(-1),
                Err(ConversionError::OutOfRange {
                    type_name: "char",
                    value: "-1".to_owned(),
                }),
            ),
        ];

        for (value, want) in cases {
            assert_eq!(bind::<char>(value.clone()), want, "{value:?}");
        }
    }
}
