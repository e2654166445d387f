/// The discriminator key used unless configured otherwise.
pub const DEFAULT_DISCRIMINATOR_KEY: &str = "@type";

/// Options for [serialize](crate::serialize),
/// [deserialize](crate::deserialize) and [bind](crate::bind).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Options {
    /// Emit and honor the discriminator field carrying the runtime
    /// type's simple name.
    pub use_type_info: bool,

    /// The object key holding the discriminator.
    pub discriminator_key: String,

    /// Track line and column while parsing, so errors carry a
    /// position.
    pub collect_line_info: bool,

    /// Parse standard JSON instead of the lenient grammar. See
    /// [Parser::strict](crate::parser::Parser::strict).
    pub strict: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            use_type_info: false,
            discriminator_key: DEFAULT_DISCRIMINATOR_KEY.to_owned(),
            collect_line_info: false,
            strict: false,
        }
    }
}

impl Options {
    pub fn with_type_info(mut self, on: bool) -> Self {
        self.use_type_info = on;
        self
    }

    pub fn with_discriminator_key(mut self, key: impl Into<String>) -> Self {
        self.discriminator_key = key.into();
        self
    }

    pub fn with_line_info(mut self, on: bool) -> Self {
        self.collect_line_info = on;
        self
    }

    pub fn with_strict(mut self, on: bool) -> Self {
        self.strict = on;
        self
    }
}
