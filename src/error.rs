use std::fmt;

use thiserror::Error;

/// Malformed input text.
///
/// `line` and `column` are 1-based when the parser collected line
/// information, and both zero otherwise.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }

    /// Returns true if the error carries a position.
    pub fn has_position(&self) -> bool {
        self.line != 0
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.has_position() {
            write!(
                f,
                "Parse error: {} at line {}, column {}.",
                self.message, self.line, self.column
            )
        } else {
            write!(f, "Parse error: {}.", self.message)
        }
    }
}

impl std::error::Error for ParseError {}

/// A structurally valid value that the target type cannot represent.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ConversionError {
    /// The value has a shape the target cannot be built from.
    #[error("cannot convert {found} into {expected}")]
    InvalidType {
        expected: &'static str,
        found: &'static str,
    },

    /// No variant of an enum matches the name or number.
    #[error("{value:?} is not a variant of {type_name}")]
    UnknownVariant {
        type_name: &'static str,
        value: String,
    },

    /// Text that should hold a number, boolean or character doesn't.
    #[error("{value:?} is not a valid {type_name}")]
    InvalidFormat {
        type_name: &'static str,
        value: String,
    },

    /// A number doesn't fit the target.
    #[error("{value} is out of range for {type_name}")]
    OutOfRange {
        type_name: &'static str,
        value: String,
    },

    /// Null was given for a target that cannot be absent.
    #[error("null cannot be converted into {type_name}")]
    UnexpectedNull { type_name: &'static str },

    /// A polymorphic base with no resolvable subtype.
    #[error("no constructor available for {type_name}")]
    MissingConstructor { type_name: &'static str },

    /// Binding a member of an object failed.
    #[error("member {member:?} of {type_name}: {source}")]
    Member {
        type_name: &'static str,
        member: &'static str,
        #[source]
        source: Box<ConversionError>,
    },
}

impl ConversionError {
    pub(crate) fn member(type_name: &'static str, member: &'static str, source: Self) -> Self {
        Self::Member {
            type_name,
            member,
            source: Box::new(source),
        }
    }
}

/// The error returned from [deserialize](crate::deserialize).
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}
