use std::any::Any;
use std::fmt;
use std::sync::Arc;

use super::Scalar;
use crate::error::CodecError;
use crate::handler::{downcast_box, downcast_mut, downcast_ref};
use crate::key::{Type, TypeKey};
use crate::value::{Number, Value};

// -----------------------------------------------------------------------------
// Shape

/// What kind of type a [`Descriptor`](super::Descriptor) describes.
///
/// Every variant carries type-erased accessors, so a handler built from a
/// shape can work on `&dyn Any` values without knowing the concrete type.
#[derive(Clone, Debug)]
pub enum Shape {
    /// A leaf with a native wire representation.
    Scalar(ScalarShape),
    /// `Option<T>`: absent on the wire when `None`.
    Optional(OptionalShape),
    /// `Box<T>`: transparent on the wire.
    Boxed(BoxedShape),
    /// `Vec<T>`: a list on the wire.
    Sequence(SequenceShape),
    /// A struct with named members: a map on the wire.
    Record(RecordShape),
    /// A fieldless enum: the variant name on the wire.
    Enumeration(EnumerationShape),
}

impl Shape {
    /// A short name for diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Optional(_) => "optional",
            Self::Boxed(_) => "boxed",
            Self::Sequence(_) => "sequence",
            Self::Record(_) => "record",
            Self::Enumeration(_) => "enumeration",
        }
    }
}

// -----------------------------------------------------------------------------
// ScalarShape

/// Accessors of a [`Scalar`] type.
#[derive(Clone, Copy)]
pub struct ScalarShape {
    encode: fn(&dyn Any) -> Result<Value, CodecError>,
    decode: fn(&Value) -> Result<Box<dyn Any>, CodecError>,
    zero: fn() -> Box<dyn Any>,
    number: fn(&dyn Any) -> Option<Number>,
    length: fn(&dyn Any) -> Option<usize>,
}

fn scalar_encode<T: Scalar>(value: &dyn Any) -> Result<Value, CodecError> {
    Ok(downcast_ref::<T>(value)?.to_value())
}

fn scalar_decode<T: Scalar>(input: &Value) -> Result<Box<dyn Any>, CodecError> {
    Ok(Box::new(T::from_value(input)?))
}

fn scalar_zero<T: Scalar>() -> Box<dyn Any> {
    Box::new(T::zero())
}

fn scalar_number<T: Scalar>(value: &dyn Any) -> Option<Number> {
    value.downcast_ref::<T>()?.number()
}

fn scalar_length<T: Scalar>(value: &dyn Any) -> Option<usize> {
    value.downcast_ref::<T>()?.length()
}

impl ScalarShape {
    pub fn of<T: Scalar>() -> Self {
        Self {
            encode: scalar_encode::<T>,
            decode: scalar_decode::<T>,
            zero: scalar_zero::<T>,
            number: scalar_number::<T>,
            length: scalar_length::<T>,
        }
    }

    #[inline]
    pub fn encode(&self, value: &dyn Any) -> Result<Value, CodecError> {
        (self.encode)(value)
    }

    #[inline]
    pub fn decode(&self, input: &Value) -> Result<Box<dyn Any>, CodecError> {
        (self.decode)(input)
    }

    #[inline]
    pub fn zero(&self) -> Box<dyn Any> {
        (self.zero)()
    }

    /// See [`Scalar::number`].
    #[inline]
    pub fn number(&self, value: &dyn Any) -> Option<Number> {
        (self.number)(value)
    }

    /// See [`Scalar::length`].
    #[inline]
    pub fn length(&self, value: &dyn Any) -> Option<usize> {
        (self.length)(value)
    }
}

impl fmt::Debug for ScalarShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ScalarShape")
    }
}

// -----------------------------------------------------------------------------
// OptionalShape

/// Accessors of an `Option<T>`.
#[derive(Clone, Copy)]
pub struct OptionalShape {
    inner: Type,
    get: fn(&dyn Any) -> Option<Option<&dyn Any>>,
    none: fn() -> Box<dyn Any>,
    some: fn(Box<dyn Any>) -> Result<Box<dyn Any>, CodecError>,
}

fn option_get<T: Any>(value: &dyn Any) -> Option<Option<&dyn Any>> {
    let option = value.downcast_ref::<Option<T>>()?;
    Some(option.as_ref().map(|inner| inner as &dyn Any))
}

fn option_none<T: Any>() -> Box<dyn Any> {
    Box::new(None::<T>)
}

fn option_some<T: Any>(inner: Box<dyn Any>) -> Result<Box<dyn Any>, CodecError> {
    Ok(Box::new(Some(downcast_box::<T>(inner)?)))
}

impl OptionalShape {
    pub fn of<T: Any>() -> Self {
        Self {
            inner: Type::of::<T>(),
            get: option_get::<T>,
            none: option_none::<T>,
            some: option_some::<T>,
        }
    }

    /// The `T` of `Option<T>`.
    #[inline]
    pub const fn inner(&self) -> Type {
        self.inner
    }

    /// Returns `Some(None)` for a `None` value, and `None` if `value` is not
    /// an `Option<T>` at all.
    #[inline]
    pub fn get<'a>(&self, value: &'a dyn Any) -> Option<Option<&'a dyn Any>> {
        (self.get)(value)
    }

    #[inline]
    pub fn none(&self) -> Box<dyn Any> {
        (self.none)()
    }

    /// Wraps a boxed `T` into a boxed `Option<T>`.
    #[inline]
    pub fn some(&self, inner: Box<dyn Any>) -> Result<Box<dyn Any>, CodecError> {
        (self.some)(inner)
    }
}

impl fmt::Debug for OptionalShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionalShape")
            .field("inner", &self.inner)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// BoxedShape

/// Accessors of a `Box<T>`.
#[derive(Clone, Copy)]
pub struct BoxedShape {
    inner: Type,
    get: fn(&dyn Any) -> Option<&dyn Any>,
    wrap: fn(Box<dyn Any>) -> Result<Box<dyn Any>, CodecError>,
}

fn boxed_get<T: Any>(value: &dyn Any) -> Option<&dyn Any> {
    let boxed = value.downcast_ref::<Box<T>>()?;
    Some(&**boxed as &dyn Any)
}

fn boxed_wrap<T: Any>(inner: Box<dyn Any>) -> Result<Box<dyn Any>, CodecError> {
    match inner.downcast::<T>() {
        Ok(boxed) => Ok(Box::new(boxed)),
        Err(_) => Err(CodecError::mismatch::<T>()),
    }
}

impl BoxedShape {
    pub fn of<T: Any>() -> Self {
        Self {
            inner: Type::of::<T>(),
            get: boxed_get::<T>,
            wrap: boxed_wrap::<T>,
        }
    }

    /// The `T` of `Box<T>`.
    #[inline]
    pub const fn inner(&self) -> Type {
        self.inner
    }

    #[inline]
    pub fn get<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any> {
        (self.get)(value)
    }

    /// Wraps a boxed `T` into a boxed `Box<T>`.
    #[inline]
    pub fn wrap(&self, inner: Box<dyn Any>) -> Result<Box<dyn Any>, CodecError> {
        (self.wrap)(inner)
    }
}

impl fmt::Debug for BoxedShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedShape")
            .field("inner", &self.inner)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// SequenceShape

/// Accessors of a `Vec<T>`.
#[derive(Clone, Copy)]
pub struct SequenceShape {
    element: Type,
    items: fn(&dyn Any) -> Option<Vec<&dyn Any>>,
    collect: fn(Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, CodecError>,
    empty: fn() -> Box<dyn Any>,
}

fn vec_items<T: Any>(value: &dyn Any) -> Option<Vec<&dyn Any>> {
    let vec = value.downcast_ref::<Vec<T>>()?;
    Some(vec.iter().map(|item| item as &dyn Any).collect())
}

fn vec_collect<T: Any>(items: Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, CodecError> {
    let vec = items
        .into_iter()
        .map(downcast_box::<T>)
        .collect::<Result<Vec<T>, _>>()?;
    Ok(Box::new(vec))
}

fn vec_empty<T: Any>() -> Box<dyn Any> {
    Box::new(Vec::<T>::new())
}

impl SequenceShape {
    pub fn of<T: Any>() -> Self {
        Self {
            element: Type::of::<T>(),
            items: vec_items::<T>,
            collect: vec_collect::<T>,
            empty: vec_empty::<T>,
        }
    }

    /// The `T` of `Vec<T>`.
    #[inline]
    pub const fn element(&self) -> Type {
        self.element
    }

    /// Borrows every item, or returns `None` if `value` is not a `Vec<T>`.
    #[inline]
    pub fn items<'a>(&self, value: &'a dyn Any) -> Option<Vec<&'a dyn Any>> {
        (self.items)(value)
    }

    /// Builds a boxed `Vec<T>` from boxed items.
    #[inline]
    pub fn collect(&self, items: Vec<Box<dyn Any>>) -> Result<Box<dyn Any>, CodecError> {
        (self.collect)(items)
    }

    #[inline]
    pub fn empty(&self) -> Box<dyn Any> {
        (self.empty)()
    }
}

impl fmt::Debug for SequenceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceShape")
            .field("element", &self.element)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// RecordShape

trait MemberAccess: Send + Sync {
    fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Any>;

    fn set(&self, owner: &mut dyn Any, value: Box<dyn Any>) -> Result<(), CodecError>;
}

pub(super) struct TypedMember<T, F> {
    pub(super) get: fn(&T) -> &F,
    pub(super) set: fn(&mut T, F),
}

impl<T: Any, F: Any> MemberAccess for TypedMember<T, F> {
    fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Any> {
        let owner = owner.downcast_ref::<T>()?;
        Some((self.get)(owner) as &dyn Any)
    }

    fn set(&self, owner: &mut dyn Any, value: Box<dyn Any>) -> Result<(), CodecError> {
        let owner = downcast_mut::<T>(owner)?;
        (self.set)(owner, downcast_box::<F>(value)?);
        Ok(())
    }
}

/// One named member of a record.
#[derive(Clone)]
pub struct Member {
    name: &'static str,
    key: TypeKey,
    access: Arc<dyn MemberAccess>,
}

impl Member {
    pub(super) fn new<T: Any, F: Any>(
        name: &'static str,
        key: TypeKey,
        access: TypedMember<T, F>,
    ) -> Self {
        Self {
            name,
            key,
            access: Arc::new(access),
        }
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The member's type, with the tags declared on it.
    #[inline]
    pub const fn key(&self) -> &TypeKey {
        &self.key
    }

    /// Borrows the member out of its owner.
    #[inline]
    pub fn get<'a>(&self, owner: &'a dyn Any) -> Option<&'a dyn Any> {
        self.access.get(owner)
    }

    /// Moves a boxed member value into its owner.
    #[inline]
    pub fn set(&self, owner: &mut dyn Any, value: Box<dyn Any>) -> Result<(), CodecError> {
        self.access.set(owner, value)
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("key", &self.key)
            .finish()
    }
}

/// Accessors of a record: a bare constructor plus its members in declaration order.
#[derive(Clone)]
pub struct RecordShape {
    new: fn() -> Box<dyn Any>,
    members: Arc<[Member]>,
}

impl RecordShape {
    pub(super) fn new(new: fn() -> Box<dyn Any>, members: Vec<Member>) -> Self {
        Self {
            new,
            members: members.into(),
        }
    }

    /// Creates a bare record with every member at its default.
    #[inline]
    pub fn construct(&self) -> Box<dyn Any> {
        (self.new)()
    }

    #[inline]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.name == name)
    }
}

impl fmt::Debug for RecordShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordShape")
            .field("members", &self.members)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// EnumerationShape

trait VariantAccess: Send + Sync {
    fn name_of(&self, value: &dyn Any) -> Option<&'static str>;

    fn make(&self, name: &str) -> Option<Box<dyn Any>>;
}

pub(super) struct TypedVariants<T> {
    pub(super) variants: Vec<(&'static str, T)>,
}

impl<T> VariantAccess for TypedVariants<T>
where
    T: Any + Clone + PartialEq + Send + Sync,
{
    fn name_of(&self, value: &dyn Any) -> Option<&'static str> {
        let value = value.downcast_ref::<T>()?;
        self.variants
            .iter()
            .find(|(_, variant)| variant == value)
            .map(|(name, _)| *name)
    }

    fn make(&self, name: &str) -> Option<Box<dyn Any>> {
        self.variants
            .iter()
            .find(|(variant, _)| *variant == name)
            .map(|(_, value)| Box::new(value.clone()) as Box<dyn Any>)
    }
}

/// Accessors of a fieldless enum.
#[derive(Clone)]
pub struct EnumerationShape {
    names: Arc<[&'static str]>,
    access: Arc<dyn VariantAccess>,
}

impl EnumerationShape {
    pub(super) fn new<T>(variants: TypedVariants<T>) -> Self
    where
        T: Any + Clone + PartialEq + Send + Sync,
    {
        Self {
            names: variants.variants.iter().map(|(name, _)| *name).collect(),
            access: Arc::new(variants),
        }
    }

    /// Variant names in declaration order.
    #[inline]
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// The name of the variant `value` holds.
    #[inline]
    pub fn name_of(&self, value: &dyn Any) -> Option<&'static str> {
        self.access.name_of(value)
    }

    /// Creates the variant called `name`.
    #[inline]
    pub fn make(&self, name: &str) -> Option<Box<dyn Any>> {
        self.access.make(name)
    }
}

impl fmt::Debug for EnumerationShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumerationShape")
            .field("names", &self.names)
            .finish()
    }
}
