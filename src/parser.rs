//! Parses the lenient JSON superset into a [Value].
//!
//! The default grammar is structurally JSON, but string and key
//! tokens may be unquoted or single-quoted, and raw line breaks
//! inside a string continue it. A strict mode accepting standard
//! JSON is available through [Parser::strict].

use std::collections::HashMap;
use std::str::FromStr;

use crate::convert::parse_decimal;
use crate::error::ParseError;
use crate::value::Value;

/// Parses `text` with the lenient grammar.
///
/// If `collect_line_info` is true, errors carry the line and column
/// where parsing stopped.
pub fn parse(text: &str, collect_line_info: bool) -> Result<Value, ParseError> {
    Parser::new(text).collect_line_info(collect_line_info).parse()
}

/// Arrays and objects nested deeper than this are rejected.
pub const MAX_DEPTH: usize = 512;

/// A single-use recursive-descent parser.
///
/// The offset only moves forward. Line and column are 1-based and
/// only maintained if line information is collected.
pub struct Parser<'a> {
    input: &'a str,
    len: usize,
    pos: usize,
    line: usize,
    column: usize,
    depth: usize,
    collect_line_info: bool,
    strict: bool,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            len: input.len(),
            pos: 0,
            line: 1,
            column: 1,
            depth: 0,
            collect_line_info: false,
            strict: false,
        }
    }

    /// Tracks line and column so errors can report them.
    pub fn collect_line_info(mut self, on: bool) -> Self {
        self.collect_line_info = on;
        self
    }

    /// Switches to standard JSON: strings end only at an unescaped
    /// `"`, keys must be quoted, and `true`, `false` and `null` are
    /// literals instead of strings.
    pub fn strict(mut self, on: bool) -> Self {
        self.strict = on;
        self
    }

    /// Parses one value, which must span the whole input apart from
    /// surrounding whitespace.
    pub fn parse(mut self) -> Result<Value, ParseError> {
        let value = self.value()?;

        self.skip_whitespace();

        if self.pos != self.len {
            return Err(self.error("extra characters at end"));
        }

        Ok(value)
    }

    fn error(&self, message: &str) -> ParseError {
        if self.collect_line_info {
            ParseError::new(message, self.line, self.column)
        } else {
            ParseError::new(message, 0, 0)
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn is_next(&self, c: char) -> bool {
        self.peek() == Some(c)
    }

    fn track(&mut self, c: char) {
        if self.collect_line_info {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    /// Consumes one character.
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;

        self.pos += c.len_utf8();
        self.track(c);

        Some(c)
    }

    /// Consumes everything up to the byte offset `end`.
    fn advance_to(&mut self, end: usize) {
        if self.collect_line_info {
            let consumed = &self.input[self.pos..end];

            for c in consumed.chars() {
                self.track(c);
            }
        }

        self.pos = end;
    }

    fn expect(&mut self, c: char) -> Result<(), ParseError> {
        if self.is_next(c) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", c)))
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\r' | '\n') = self.peek() {
            self.bump();
        }
    }

    fn value(&mut self) -> Result<Value, ParseError> {
        self.skip_whitespace();

        let c = match self.peek() {
            Some(c) => c,
            None => return Err(self.error("unexpected end of input")),
        };

        match c {
            '"' => {
                self.bump();

                if self.strict {
                    self.quoted_string().map(Value::String)
                } else {
                    self.lenient_string().map(Value::String)
                }
            }
            '\'' if !self.strict => {
                self.bump();
                self.lenient_string().map(Value::String)
            }
            '[' => self.nested(Self::array),
            '{' => self.nested(Self::object),
            '-' | '0'..='9' => self.number(),
            _ if self.strict => self.literal(),
            _ => self.lenient_string().map(Value::String),
        }
    }

    /// Consumes an opening bracket and parses the container after it.
    fn nested(
        &mut self,
        container: fn(&mut Self) -> Result<Value, ParseError>,
    ) -> Result<Value, ParseError> {
        if self.depth == MAX_DEPTH {
            return Err(self.error("maximum nesting depth exceeded"));
        }

        self.bump();
        self.depth += 1;
        let value = container(self);
        self.depth -= 1;

        value
    }

    fn number(&mut self) -> Result<Value, ParseError> {
        let bytes = self.input.as_bytes();
        let mut end = self.pos;
        let mut fractional = false;

        if bytes.get(end) == Some(&b'-') {
            end += 1;
        }

        end = self.expect_digits(end)?;

        if bytes.get(end) == Some(&b'.') {
            fractional = true;
            end = self.expect_digits(end + 1)?;
        }

        if let Some(b'e' | b'E') = bytes.get(end) {
            fractional = true;
            end += 1;

            if let Some(b'-' | b'+') = bytes.get(end) {
                end += 1;
            }

            end = self.expect_digits(end)?;
        }

        let text = &self.input[self.pos..end];
        let value = if fractional {
            parse_decimal(text)
                .map(Value::Decimal)
                .or_else(|| text.parse().ok().map(Value::Double))
                .ok_or_else(|| self.error("cannot parse decimal number"))?
        } else {
            text.parse()
                .map(Value::Int32)
                .or_else(|_| text.parse().map(Value::Int64))
                .map_err(|_| self.error("cannot parse integer number"))?
        };

        self.advance_to(end);

        Ok(value)
    }

    /// Returns the offset after a non-empty run of ASCII digits
    /// starting at `start`.
    fn expect_digits(&self, start: usize) -> Result<usize, ParseError> {
        let n = self.input.as_bytes()[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();

        if n == 0 {
            return Err(self.error("not a number"));
        }

        Ok(start + n)
    }

    /// Scans a string in the lenient grammar. The opening quote, if
    /// any, has been consumed.
    ///
    /// The token ends before an unescaped `:`, `,` or `}`, and after
    /// a `'`. A `"` only closes the token if a structural character
    /// or line break follows it; otherwise it is content. Line
    /// breaks, and any whitespace after them, are skipped.
    fn lenient_string(&mut self) -> Result<String, ParseError> {
        let mut s = String::new();

        loop {
            let c = match self.peek() {
                Some(c) => c,
                None => return Err(self.error("unterminated string")),
            };

            match c {
                ':' | ',' | '}' => return Ok(s),
                '\'' => {
                    self.bump();
                    return Ok(s);
                }
                '\r' | '\n' => {
                    self.bump();
                    self.skip_whitespace();
                }
                '"' => {
                    self.bump();

                    match self.peek() {
                        None => return Ok(s),
                        Some('}' | ',' | '\r' | '\n' | ':') => {}
                        Some(_) => s.push('"'),
                    }
                }
                '\\' => {
                    self.bump();
                    s.push(self.escape()?);
                }
                c if (c as u32) < 0x20 => return Err(self.error("control character in string")),
                c => {
                    self.bump();
                    s.push(c);
                }
            }
        }
    }

    /// Scans a standard JSON string. The opening quote has been
    /// consumed.
    fn quoted_string(&mut self) -> Result<String, ParseError> {
        let mut s = String::new();

        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string")),
                Some('"') => {
                    self.bump();
                    return Ok(s);
                }
                Some('\\') => {
                    self.bump();
                    s.push(self.escape()?);
                }
                Some(c) if (c as u32) < 0x20 => {
                    return Err(self.error("control character in string"))
                }
                Some(c) => {
                    self.bump();
                    s.push(c);
                }
            }
        }
    }

    /// Decodes an escape sequence. The backslash has been consumed.
    fn escape(&mut self) -> Result<char, ParseError> {
        let c = match self.bump() {
            Some(c) => c,
            None => return Err(self.error("unterminated escape sequence in string")),
        };

        Ok(match c {
            '"' | '/' | '\\' => c,
            'b' => '\x08',
            'f' => '\x0C',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => return self.unicode_escape(),
            _ => return Err(self.error("unknown escape sequence in string")),
        })
    }

    fn unicode_escape(&mut self) -> Result<char, ParseError> {
        let unit = self.hex_unit()?;

        // See https://en.wikipedia.org/wiki/UTF-16#Code_points_from_U+010000_to_U+10FFFF
        if (0xD800..0xDC00).contains(&unit) && self.input[self.pos..].starts_with("\\u") {
            let low = self
                .input
                .get(self.pos + 2..self.pos + 6)
                .filter(|digits| digits.bytes().all(|b| b.is_ascii_hexdigit()))
                .and_then(|digits| u16::from_str_radix(digits, 16).ok())
                .filter(|low| (0xDC00..0xE000).contains(low));

            if let Some(low) = low {
                self.advance_to(self.pos + 6);

                let c = 0x10000 + (((unit as u32) - 0xD800) << 10) + ((low as u32) - 0xDC00);

                return Ok(char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
        }

        Ok(char::from_u32(unit as u32).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    /// Reads the four hex digits of a `\u` escape.
    fn hex_unit(&mut self) -> Result<u16, ParseError> {
        if self.len - self.pos < 4 {
            return Err(self.error("unterminated unicode escape in string"));
        }

        let unit = self
            .input
            .get(self.pos..self.pos + 4)
            .filter(|digits| digits.bytes().all(|b| b.is_ascii_hexdigit()))
            .and_then(|digits| u16::from_str_radix(digits, 16).ok())
            .ok_or_else(|| self.error("not a well-formed unicode escape sequence in string"))?;

        self.advance_to(self.pos + 4);

        Ok(unit)
    }

    /// Recognizes `true`, `false` and `null`. Only reachable in
    /// strict mode; the lenient grammar reads them as strings.
    fn literal(&mut self) -> Result<Value, ParseError> {
        const LITERALS: [(&str, Value); 3] = [
            ("true", Value::Bool(true)),
            ("false", Value::Bool(false)),
            ("null", Value::Null),
        ];

        for (text, value) in LITERALS {
            if self.input[self.pos..].starts_with(text) {
                self.advance_to(self.pos + text.len());
                return Ok(value);
            }
        }

        Err(self.error("unknown token"))
    }

    /// Parses array elements. The `[` has been consumed.
    fn array(&mut self) -> Result<Value, ParseError> {
        let mut items = Vec::new();

        self.skip_whitespace();

        if self.is_next(']') {
            self.bump();
            return Ok(Value::Array(items));
        }

        loop {
            items.push(self.value()?);

            self.skip_whitespace();

            match self.peek() {
                Some(']') => {
                    self.bump();
                    return Ok(Value::Array(items));
                }
                Some(',') => {
                    self.bump();
                }
                Some(_) => return Err(self.error("expected ',' or ']'")),
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    /// Parses object entries. The `{` has been consumed.
    fn object(&mut self) -> Result<Value, ParseError> {
        let mut entries = HashMap::new();

        self.skip_whitespace();

        if self.is_next('}') {
            self.bump();
            return Ok(Value::Object(entries));
        }

        loop {
            self.skip_whitespace();

            let key = self.key()?;

            self.skip_whitespace();
            self.expect(':')?;

            let value = self.value()?;

            entries.insert(key, value);

            self.skip_whitespace();

            match self.peek() {
                Some('}') => {
                    self.bump();
                    return Ok(Value::Object(entries));
                }
                Some(',') => {
                    self.bump();
                }
                Some(_) => return Err(self.error("expected ',' or '}'")),
                None => return Err(self.error("unterminated object")),
            }
        }
    }

    fn key(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            None => Err(self.error("unterminated object")),
            Some('"') if self.strict => {
                self.bump();
                self.quoted_string()
            }
            Some(_) if self.strict => Err(self.error("expected string key")),
            Some(c) => {
                if c == '"' || c == '\'' {
                    self.bump();
                }

                self.lenient_string()
            }
        }
    }
}

/// Parses with the lenient grammar, without line information.
impl FromStr for Value {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s, false)
    }
}
