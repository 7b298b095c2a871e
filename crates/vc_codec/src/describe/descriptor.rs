use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use super::shape::{TypedMember, TypedVariants};
use super::{
    BoxedShape, EnumerationShape, Member, OptionalShape, RecordShape, Scalar, ScalarShape,
    SequenceShape, Shape, TypeCatalog,
};
use crate::key::{Tags, Type, TypeKey};

// -----------------------------------------------------------------------------
// Describe

/// A type that can describe its own structure.
///
/// Implemented for the primitives, `String`, `Option<T>`, `Box<T>` and
/// `Vec<T>`. Application records and enums implement it with the
/// [`Descriptor`] builders.
pub trait Describe: Any {
    fn describe() -> Descriptor;
}

// -----------------------------------------------------------------------------
// Descriptor

/// The structural description of one type.
///
/// Besides the [`Shape`], a descriptor remembers how to register every type
/// it mentions, so [`TypeCatalog::register`] can pull in a whole type graph
/// from its root.
#[derive(Clone)]
pub struct Descriptor {
    ty: Type,
    shape: Shape,
    dependencies: Vec<fn(&mut TypeCatalog)>,
}

impl Descriptor {
    /// Describes a [`Scalar`].
    pub fn scalar<T: Scalar>() -> Self {
        Self {
            ty: Type::of::<T>(),
            shape: Shape::Scalar(ScalarShape::of::<T>()),
            dependencies: Vec::new(),
        }
    }

    /// Describes `Option<T>`.
    pub fn optional<T: Describe>() -> Self {
        Self {
            ty: Type::of::<Option<T>>(),
            shape: Shape::Optional(OptionalShape::of::<T>()),
            dependencies: vec![TypeCatalog::register::<T>],
        }
    }

    /// Describes `Box<T>`.
    pub fn boxed<T: Describe>() -> Self {
        Self {
            ty: Type::of::<Box<T>>(),
            shape: Shape::Boxed(BoxedShape::of::<T>()),
            dependencies: vec![TypeCatalog::register::<T>],
        }
    }

    /// Describes `Vec<T>`.
    pub fn sequence<T: Describe>() -> Self {
        Self {
            ty: Type::of::<Vec<T>>(),
            shape: Shape::Sequence(SequenceShape::of::<T>()),
            dependencies: vec![TypeCatalog::register::<T>],
        }
    }

    /// Starts describing a record.
    ///
    /// The bare record comes from [`Default`]; members are added with
    /// [`RecordBuilder::member`].
    pub fn record<T: Default + Any>() -> RecordBuilder<T> {
        RecordBuilder {
            new: record_new::<T>,
            members: Vec::new(),
            dependencies: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Starts describing a fieldless enum.
    pub fn enumeration<T>() -> EnumerationBuilder<T>
    where
        T: Any + Clone + PartialEq + Send + Sync,
    {
        EnumerationBuilder {
            variants: Vec::new(),
        }
    }

    #[inline]
    pub const fn ty(&self) -> Type {
        self.ty
    }

    #[inline]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    pub(super) fn dependencies(&self) -> &[fn(&mut TypeCatalog)] {
        &self.dependencies
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("ty", &self.ty)
            .field("shape", &self.shape)
            .finish()
    }
}

fn record_new<T: Default + Any>() -> Box<dyn Any> {
    Box::new(T::default())
}

// -----------------------------------------------------------------------------
// RecordBuilder

/// Builds the [`Descriptor`] of a record, see [`Descriptor::record`].
pub struct RecordBuilder<T> {
    new: fn() -> Box<dyn Any>,
    members: Vec<Member>,
    dependencies: Vec<fn(&mut TypeCatalog)>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Any> RecordBuilder<T> {
    /// Adds an untagged member.
    #[inline]
    pub fn member<F: Describe>(
        self,
        name: &'static str,
        get: fn(&T) -> &F,
        set: fn(&mut T, F),
    ) -> Self {
        self.member_tagged(name, Tags::new(), get, set)
    }

    /// Adds a member whose type-use carries `tags`.
    ///
    /// The tags become part of the member's [`TypeKey`], so the member
    /// resolves its own handlers, distinct from the untagged type.
    pub fn member_tagged<F: Describe>(
        mut self,
        name: &'static str,
        tags: impl Into<Tags>,
        get: fn(&T) -> &F,
        set: fn(&mut T, F),
    ) -> Self {
        let key = TypeKey::new(Type::of::<F>(), tags.into());
        self.members.push(Member::new(name, key, TypedMember { get, set }));
        self.dependencies.push(TypeCatalog::register::<F>);
        self
    }

    pub fn build(self) -> Descriptor {
        Descriptor {
            ty: Type::of::<T>(),
            shape: Shape::Record(RecordShape::new(self.new, self.members)),
            dependencies: self.dependencies,
        }
    }
}

// -----------------------------------------------------------------------------
// EnumerationBuilder

/// Builds the [`Descriptor`] of a fieldless enum, see [`Descriptor::enumeration`].
pub struct EnumerationBuilder<T> {
    variants: Vec<(&'static str, T)>,
}

impl<T> EnumerationBuilder<T>
where
    T: Any + Clone + PartialEq + Send + Sync,
{
    pub fn variant(mut self, name: &'static str, value: T) -> Self {
        self.variants.push((name, value));
        self
    }

    pub fn build(self) -> Descriptor {
        Descriptor {
            ty: Type::of::<T>(),
            shape: Shape::Enumeration(EnumerationShape::new(TypedVariants {
                variants: self.variants,
            })),
            dependencies: Vec::new(),
        }
    }
}
