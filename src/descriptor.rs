//! Per-type metadata driving binding and emission.
//!
//! A [TypeDescriptor] lists the bindable members of a record type,
//! and a [SubtypeTable] lists the concrete types behind a polymorphic
//! base. Both are built once per type and shared process-wide through
//! [registry::cached](crate::registry::cached), which is what the
//! derives in [derive](crate::derive) generate.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::PoisonError;
use std::sync::RwLock;

use tracing::trace;

use crate::bind::Bind;
use crate::bind::Binder;
use crate::emit::Emit;
use crate::error::ConversionError;
use crate::value::Value;

/// A record type with a process-wide descriptor.
pub trait Describe: Sized + 'static {
    fn descriptor() -> &'static TypeDescriptor<Self>;
}

/// A polymorphic base type, listing the concrete types it can hold.
pub trait Polymorphic: Sized + 'static {
    fn subtypes() -> &'static SubtypeTable<Self>;
}

/// Folds a name so that names differing only in letter case compare
/// equal.
pub(crate) fn fold_case(s: &str) -> String {
    s.chars().flat_map(char::to_uppercase).collect()
}

pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_uppercase)
        .eq(b.chars().flat_map(char::to_uppercase))
}

/// Case-insensitive ordering, falling back to ordinal order so the
/// result is total.
pub(crate) fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_uppercase)
        .cmp(b.chars().flat_map(char::to_uppercase))
        .then_with(|| a.cmp(b))
}

/// The members of a record type, in case-insensitive name order.
pub struct TypeDescriptor<T> {
    name: &'static str,
    tagged: bool,
    members: Vec<MemberDescriptor<T>>,
    index: HashMap<String, usize>,
}

impl<T: 'static> TypeDescriptor<T> {
    pub fn builder(name: &'static str) -> TypeDescriptorBuilder<T> {
        TypeDescriptorBuilder {
            name,
            tagged: false,
            members: Vec::new(),
        }
    }

    /// The simple name written as the discriminator.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the type announces its name when emitted on its own.
    pub fn is_tagged(&self) -> bool {
        self.tagged
    }

    pub fn members(&self) -> &[MemberDescriptor<T>] {
        &self.members
    }

    /// Looks up a member by external name, ignoring case.
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor<T>> {
        self.index.get(&fold_case(name)).map(|&i| &self.members[i])
    }
}

impl<T> fmt::Debug for TypeDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("tagged", &self.tagged)
            .field("members", &self.members)
            .finish()
    }
}

pub struct TypeDescriptorBuilder<T> {
    name: &'static str,
    tagged: bool,
    members: Vec<MemberDescriptor<T>>,
}

impl<T: 'static> TypeDescriptorBuilder<T> {
    pub fn tagged(mut self, tagged: bool) -> Self {
        self.tagged = tagged;
        self
    }

    /// Adds a member reached through `get` and `get_mut`. `default`
    /// is the value a freshly constructed `T` holds for it; members
    /// equal to it are left out when emitting.
    pub fn member<F>(
        mut self,
        name: &'static str,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
        default: F,
    ) -> Self
    where
        F: Bind + Emit + Send + Sync + 'static,
    {
        self.members.push(MemberDescriptor {
            name,
            type_name: std::any::type_name::<F>(),
            access: Box::new(Field {
                get,
                get_mut,
                default,
            }),
        });
        self
    }

    pub fn build(mut self) -> TypeDescriptor<T> {
        self.members.sort_by(|a, b| cmp_ignore_case(a.name, b.name));

        let index = self
            .members
            .iter()
            .enumerate()
            .map(|(i, member)| (fold_case(member.name), i))
            .collect();

        TypeDescriptor {
            name: self.name,
            tagged: self.tagged,
            members: self.members,
            index,
        }
    }
}

/// One bindable member of a record type.
pub struct MemberDescriptor<T> {
    name: &'static str,
    type_name: &'static str,
    access: Box<dyn Access<T>>,
}

impl<T> MemberDescriptor<T> {
    /// The external name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The declared Rust type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn get<'a>(&self, target: &'a T) -> &'a dyn Emit {
        self.access.get(target)
    }

    pub fn default_value(&self) -> &dyn Emit {
        self.access.default_value()
    }

    /// Binds `value` into the member's type and stores it in `target`.
    pub fn set(
        &self,
        target: &mut T,
        value: Value,
        binder: &Binder<'_>,
    ) -> Result<(), ConversionError> {
        self.access.set(target, value, binder)
    }
}

impl<T> fmt::Debug for MemberDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .finish()
    }
}

trait Access<T>: Send + Sync {
    fn get<'a>(&self, target: &'a T) -> &'a dyn Emit;

    fn default_value(&self) -> &dyn Emit;

    fn set(&self, target: &mut T, value: Value, binder: &Binder<'_>)
        -> Result<(), ConversionError>;
}

struct Field<T, F> {
    get: fn(&T) -> &F,
    get_mut: fn(&mut T) -> &mut F,
    default: F,
}

impl<T, F> Access<T> for Field<T, F>
where
    F: Bind + Emit + Send + Sync + 'static,
{
    fn get<'a>(&self, target: &'a T) -> &'a dyn Emit {
        (self.get)(target)
    }

    fn default_value(&self) -> &dyn Emit {
        &self.default
    }

    fn set(
        &self,
        target: &mut T,
        value: Value,
        binder: &Binder<'_>,
    ) -> Result<(), ConversionError> {
        *(self.get_mut)(target) = binder.bind(value)?;
        Ok(())
    }
}

type BindFn<E> = Box<dyn Fn(Value, &Binder<'_>) -> Result<E, ConversionError> + Send + Sync>;

struct Subtype<E> {
    name: &'static str,
    bind: BindFn<E>,
}

/// The concrete types a polymorphic base can be bound into.
///
/// Discriminators are matched against subtype names ignoring case.
/// Successful resolutions are cached under the case-folded name, so
/// the cache never holds more entries than there are subtypes.
pub struct SubtypeTable<E> {
    base: &'static str,
    subtypes: Vec<Subtype<E>>,
    fallback: Option<usize>,
    resolved: RwLock<HashMap<String, usize>>,
}

impl<E: 'static> SubtypeTable<E> {
    pub fn builder(base: &'static str) -> SubtypeTableBuilder<E> {
        SubtypeTableBuilder {
            base,
            subtypes: Vec::new(),
            fallback: None,
        }
    }

    /// The name of the base type.
    pub fn base(&self) -> &'static str {
        self.base
    }

    /// Subtype names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.subtypes.iter().map(|s| s.name)
    }

    /// The subtype used when no discriminator resolves.
    pub fn fallback(&self) -> Option<usize> {
        self.fallback
    }

    /// Finds the subtype named by `discriminator`.
    pub fn resolve(&self, discriminator: &str) -> Option<usize> {
        let folded = fold_case(discriminator);

        if let Some(&found) = self
            .resolved
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&folded)
        {
            return Some(found);
        }

        let found = self
            .subtypes
            .iter()
            .position(|s| eq_ignore_case(s.name, discriminator));

        trace!(
            base = self.base,
            discriminator,
            subtype = found.map(|i| self.subtypes[i].name),
            "resolved discriminator"
        );

        // Only hits are cached.
        if let Some(index) = found {
            self.resolved
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(folded, index);
        }

        found
    }

    pub(crate) fn bind(
        &self,
        index: usize,
        value: Value,
        binder: &Binder<'_>,
    ) -> Result<E, ConversionError> {
        (self.subtypes[index].bind)(value, binder)
    }
}

impl<E> fmt::Debug for SubtypeTable<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SubtypeTable")
            .field("base", &self.base)
            .field(
                "subtypes",
                &self.subtypes.iter().map(|s| s.name).collect::<Vec<_>>(),
            )
            .field("fallback", &self.fallback)
            .finish()
    }
}

pub struct SubtypeTableBuilder<E> {
    base: &'static str,
    subtypes: Vec<Subtype<E>>,
    fallback: Option<usize>,
}

impl<E: 'static> SubtypeTableBuilder<E> {
    /// Adds `S` as a subtype, named after its descriptor.
    pub fn subtype<S>(mut self, wrap: fn(S) -> E) -> Self
    where
        S: Describe + Bind,
    {
        self.subtypes.push(Subtype {
            name: S::descriptor().name(),
            bind: Box::new(move |value, binder| S::bind(value, binder).map(wrap)),
        });
        self
    }

    /// Adds `S` as a subtype and uses it for values without a
    /// resolvable discriminator.
    pub fn fallback<S>(mut self, wrap: fn(S) -> E) -> Self
    where
        S: Describe + Bind,
    {
        self.fallback = Some(self.subtypes.len());
        self.subtype(wrap)
    }

    pub fn build(self) -> SubtypeTable<E> {
        SubtypeTable {
            base: self.base,
            subtypes: self.subtypes,
            fallback: self.fallback,
            resolved: RwLock::new(HashMap::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use crate::registry;

    #[derive(Debug, Default, PartialEq)]
    struct Point {
        x: i32,
        y_pos: i32,
        label: Option<String>,
    }

    impl Describe for Point {
        fn descriptor() -> &'static TypeDescriptor<Self> {
            registry::cached(|| {
                TypeDescriptor::builder("Point")
                    .member("y_Pos", |p: &Point| &p.y_pos, |p: &mut Point| &mut p.y_pos, 0)
                    .member("x", |p: &Point| &p.x, |p: &mut Point| &mut p.x, 0)
                    .member("Label", |p: &Point| &p.label, |p: &mut Point| &mut p.label, None)
                    .build()
            })
        }
    }

    impl Bind for Point {
        fn bind(value: Value, binder: &Binder<'_>) -> Result<Self, ConversionError> {
            binder.bind_object(value)
        }
    }

    #[test]
    fn test_cmp_ignore_case() {
        let cases = vec![
            ("a", "B", Ordering::Less),
            ("B", "a", Ordering::Greater),
            ("abc", "ABC", Ordering::Greater),
            ("ABC", "abc", Ordering::Less),
            ("x", "x", Ordering::Equal),
            ("a", "ab", Ordering::Less),
        ];

        for (a, b, want) in cases {
            assert_eq!(cmp_ignore_case(a, b), want, "{a} vs {b}");
        }
    }

    #[test]
    fn test_member_order() {
        let names = Point::descriptor()
            .members()
            .iter()
            .map(|m| m.name())
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["Label", "x", "y_Pos"]);
    }

    #[test]
    fn test_member_lookup() {
        let descriptor = Point::descriptor();
        let cases = vec![
            ("x", Some("x")),
            ("X", Some("x")),
            ("Y_POS", Some("y_Pos")),
            ("label", Some("Label")),
            ("z", None),
        ];

        for (name, want) in cases {
            assert_eq!(descriptor.member(name).map(|m| m.name()), want, "{name}");
        }
    }

    #[test]
    fn test_descriptor_identity() {
        assert!(std::ptr::eq(Point::descriptor(), Point::descriptor()));
        assert_eq!(Point::descriptor().name(), "Point");
        assert!(!Point::descriptor().is_tagged());
    }

    #[test]
    fn test_member_set() {
        let options = Options::default();
        let binder = Binder::new(&options);
        let descriptor = Point::descriptor();
        let mut point = Point::default();

        descriptor
            .member("x")
            .unwrap()
            .set(&mut point, Value::String("12".to_owned()), &binder)
            .unwrap();
        descriptor
            .member("label")
            .unwrap()
            .set(&mut point, Value::from("a"), &binder)
            .unwrap();

        assert_eq!(
            point,
            Point {
                x: 12,
                y_pos: 0,
                label: Some("a".to_owned())
            }
        );
        assert_eq!(descriptor.member("x").unwrap().type_name(), "i32");
    }

    #[derive(Debug, PartialEq)]
    enum Shape {
        Point(Point),
    }

    #[test]
    fn test_subtype_resolve() {
        let table: SubtypeTable<Shape> = SubtypeTable::builder("Shape")
            .fallback(Shape::Point)
            .build();
        let cases = vec![
            ("Point", Some(0)),
            ("point", Some(0)),
            ("POINT", Some(0)),
            ("Circle", None),
            ("Point", Some(0)),
        ];

        for (discriminator, want) in cases {
            assert_eq!(table.resolve(discriminator), want, "{discriminator}");
        }
        assert_eq!(table.fallback(), Some(0));
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["Point"]);

        for i in 0..1000 {
            assert_eq!(table.resolve(&format!("Junk{i}")), None);
        }
        assert_eq!(table.resolve("pOiNt"), Some(0));
        assert_eq!(
            table
                .resolved
                .read()
                .unwrap()
                .iter()
                .collect::<Vec<_>>(),
            vec![(&"POINT".to_owned(), &0)]
        );

        let options = Options::default();
        let got = table
            .bind(0, Value::Object(HashMap::new()), &Binder::new(&options))
            .unwrap();
        assert_eq!(got, Shape::Point(Point::default()));
    }
}
