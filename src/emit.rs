//! Writing typed values as JSON text.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::VecDeque;

use rust_decimal::Decimal;

use crate::descriptor::cmp_ignore_case;
use crate::descriptor::Describe;
use crate::options::Options;
use crate::value::Value;

/// A value that can be written as JSON text.
///
/// Derive it with [derive::Emit](crate::derive::Emit) for records,
/// polymorphic bases and enums.
pub trait Emit {
    fn emit(&self, emitter: &mut Emitter<'_>);

    /// Returns true for values written as `null`. Null members are
    /// left out of objects.
    fn is_null(&self) -> bool {
        false
    }
}

macro_rules! format_float [
    ($($name:ident => $ty:ty),*$(,)?) => {
        $(pub(crate) fn $name(f: $ty) -> String {
            if f.is_nan() {
                "NaN".to_owned()
            } else if f.is_infinite() {
                (if f > 0.0 { "Infinity" } else { "-Infinity" }).to_owned()
            } else if f == 0.0 || (1e-5..1e15).contains(&f.abs()) {
                f.to_string()
            } else {
                format!("{:e}", f)
            }
        })*
    };
];

format_float![format_f64 => f64, format_f32 => f32];

/// Accumulates JSON text.
pub struct Emitter<'a> {
    out: String,
    options: &'a Options,
}

impl<'a> Emitter<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self {
            out: String::new(),
            options,
        }
    }

    pub fn options(&self) -> &'a Options {
        self.options
    }

    pub fn into_string(self) -> String {
        self.out
    }

    pub fn write_null(&mut self) {
        self.out.push_str("null");
    }

    /// Appends text as-is.
    pub fn write_raw(&mut self, s: &str) {
        self.out.push_str(s);
    }

    /// Writes a quoted, escaped string.
    pub fn write_str(&mut self, s: &str) {
        let mut start = 0;
        let mut end = 0;

        self.out.push('"');

        for c in s.chars() {
            if c == '\\' || c == '"' || c < ' ' {
                self.out.push_str(&s[start..end]);
                self.out.push('\\');

                match c {
                    '\x08' => self.out.push('b'),
                    '\x0C' => self.out.push('f'),
                    '\n' => self.out.push('n'),
                    '\r' => self.out.push('r'),
                    '\t' => self.out.push('t'),
                    c if c < ' ' => self.out.push_str(&format!("u{:04X}", c as u32)),
                    c => self.out.push(c),
                }

                end += c.len_utf8();
                start = end;
            } else {
                end += c.len_utf8();
            }
        }

        self.out.push_str(&s[start..end]);
        self.out.push('"');
    }

    /// Writes `[a,b,...]`.
    pub fn write_seq<'b, I, T>(&mut self, items: I)
    where
        I: IntoIterator<Item = &'b T>,
        T: Emit + ?Sized + 'b,
    {
        self.out.push('[');

        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }

            item.emit(self);
        }

        self.out.push(']');
    }

    /// Writes an object with keys in case-insensitive order.
    pub fn write_map<'b, I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (&'b K, &'b V)>,
        K: AsRef<str> + ?Sized + 'b,
        V: Emit + ?Sized + 'b,
    {
        let mut entries = entries.into_iter().collect::<Vec<_>>();
        entries.sort_by(|a, b| cmp_ignore_case(a.0.as_ref(), b.0.as_ref()));

        self.out.push('{');

        for (i, (k, v)) in entries.into_iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }

            self.write_str(k.as_ref());
            self.out.push(':');
            v.emit(self);
        }

        self.out.push('}');
    }

    /// Writes a record through its descriptor. The discriminator is
    /// written only for tagged types.
    pub fn write_object<T: Describe>(&mut self, value: &T) {
        self.write_record(value, T::descriptor().is_tagged());
    }

    /// Writes a record through its descriptor, including the
    /// discriminator whenever type information is in use.
    pub fn write_tagged<T: Describe>(&mut self, value: &T) {
        self.write_record(value, true);
    }

    fn write_record<T: Describe>(&mut self, value: &T, tagged: bool) {
        let descriptor = T::descriptor();
        let options = self.options;
        let mut first = true;

        self.out.push('{');

        if tagged && options.use_type_info {
            self.write_str(&options.discriminator_key);
            self.out.push(':');
            self.write_str(descriptor.name());
            first = false;
        }

        for member in descriptor.members() {
            let current = member.get(value);

            if current.is_null() {
                continue;
            }

            let text = self.render(current);

            if text == self.render(member.default_value()) {
                continue;
            }

            if !first {
                self.out.push(',');
            }
            first = false;

            self.write_str(member.name());
            self.out.push(':');
            self.out.push_str(&text);
        }

        self.out.push('}');
    }

    fn render(&self, value: &dyn Emit) -> String {
        let mut emitter = Emitter::new(self.options);

        value.emit(&mut emitter);
        emitter.out
    }
}

impl Emit for bool {
    fn emit(&self, emitter: &mut Emitter<'_>) {
        emitter.write_raw(if *self { "true" } else { "false" });
    }
}

macro_rules! emit_display [
    ($($ty:ty),*$(,)?) => {
        $(impl Emit for $ty {
            fn emit(&self, emitter: &mut Emitter<'_>) {
                emitter.write_raw(&self.to_string());
            }
        })*
    };
];

emit_display![i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, Decimal];

impl Emit for f64 {
    fn emit(&self, emitter: &mut Emitter<'_>) {
        emitter.write_raw(&format_f64(*self));
    }
}

impl Emit for f32 {
    fn emit(&self, emitter: &mut Emitter<'_>) {
        emitter.write_raw(&format_f32(*self));
    }
}

impl Emit for char {
    fn emit(&self, emitter: &mut Emitter<'_>) {
        emitter.write_str(self.encode_utf8(&mut [0; 4]));
    }
}

impl Emit for str {
    fn emit(&self, emitter: &mut Emitter<'_>) {
        emitter.write_str(self);
    }
}

impl Emit for String {
    fn emit(&self, emitter: &mut Emitter<'_>) {
        emitter.write_str(self);
    }
}

impl<T: Emit + ?Sized> Emit for &T {
    fn emit(&self, emitter: &mut Emitter<'_>) {
        (**self).emit(emitter);
    }

    fn is_null(&self) -> bool {
        (**self).is_null()
    }
}

impl<T: Emit + ?Sized> Emit for Box<T> {
    fn emit(&self, emitter: &mut Emitter<'_>) {
        (**self).emit(emitter);
    }

    fn is_null(&self) -> bool {
        (**self).is_null()
    }
}

impl<T: Emit> Emit for Option<T> {
    fn emit(&self, emitter: &mut Emitter<'_>) {
        match self {
            Some(v) => v.emit(emitter),
            None => emitter.write_null(),
        }
    }

    fn is_null(&self) -> bool {
        self.as_ref().map_or(true, Emit::is_null)
    }
}

impl<T: Emit> Emit for [T] {
    fn emit(&self, emitter: &mut Emitter<'_>) {
        emitter.write_seq(self);
    }
}

impl<T: Emit, const N: usize> Emit for [T; N] {
    fn emit(&self, emitter: &mut Emitter<'_>) {
        emitter.write_seq(self);
    }
}

impl<T: Emit> Emit for Vec<T> {
    fn emit(&self, emitter: &mut Emitter<'_>) {
        emitter.write_seq(self);
    }
}

impl<T: Emit> Emit for VecDeque<T> {
    fn emit(&self, emitter: &mut Emitter<'_>) {
        emitter.write_seq(self);
    }
}

impl<K: AsRef<str>, V: Emit, S> Emit for HashMap<K, V, S> {
    fn emit(&self, emitter: &mut Emitter<'_>) {
        emitter.write_map(self);
    }
}

impl<K: AsRef<str>, V: Emit> Emit for BTreeMap<K, V> {
    fn emit(&self, emitter: &mut Emitter<'_>) {
        emitter.write_map(self);
    }
}

impl Emit for Value {
    fn emit(&self, emitter: &mut Emitter<'_>) {
        match self {
            Value::Null => emitter.write_null(),
            Value::Bool(b) => b.emit(emitter),
            Value::Int32(n) => n.emit(emitter),
            Value::Int64(n) => n.emit(emitter),
            Value::Decimal(d) => d.emit(emitter),
            Value::Double(f) => f.emit(emitter),
            Value::String(s) => emitter.write_str(s),
            Value::Array(items) => emitter.write_seq(items),
            Value::Object(entries) => emitter.write_map(entries),
        }
    }

    fn is_null(&self) -> bool {
        Value::is_null(self)
    }
}
