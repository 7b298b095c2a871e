//! Structural descriptions of application types.
//!
//! The standard factories never inspect types on their own. They read a
//! [`Descriptor`] from the [`TypeCatalog`], which knows how to reach into a
//! type-erased value: read a record member, unwrap an option, list the items
//! of a sequence, and so on.
//!
//! ## Menu
//!
//! - [`Describe`]: Implemented by every type the catalog can hold.
//! - [`Scalar`]: A leaf type with a native wire representation.
//! - [`Descriptor`]: The description of one type, see its builders.
//! - [`Shape`]: What kind of type a descriptor describes.
//! - [`TypeCatalog`]: The store of descriptors, indexed by id, path and name.
//!
//! ## Registration
//!
//! Types are registered explicitly with [`TypeCatalog::register`], which also
//! registers the types they mention. With the `auto_register` feature,
//! [`auto_register!`](crate::auto_register) collects types at link time and
//! [`TypeCatalog::auto_register`] registers all of them at once.
//!
//! # Examples
//!
//! ```
//! use vc_codec::describe::{Describe, Descriptor, Shape, TypeCatalog};
//!
//! #[derive(Default)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl Describe for Point {
//!     fn describe() -> Descriptor {
//!         Descriptor::record::<Self>()
//!             .member("x", |p| &p.x, |p, v| p.x = v)
//!             .member("y", |p| &p.y, |p, v| p.y = v)
//!             .build()
//!     }
//! }
//!
//! let mut catalog = TypeCatalog::empty();
//! catalog.register::<Point>();
//!
//! let point = catalog.get_with_type_name("Point").unwrap();
//! assert!(matches!(point.shape(), Shape::Record(_)));
//! // Member types are registered along with the record.
//! assert!(catalog.contains(core::any::TypeId::of::<i32>()));
//! ```

// -----------------------------------------------------------------------------
// Modules

mod catalog;
mod descriptor;
mod impls;
mod scalar;
mod shape;

// -----------------------------------------------------------------------------
// Exports

pub use catalog::TypeCatalog;
pub use descriptor::{Describe, Descriptor, EnumerationBuilder, RecordBuilder};
pub use scalar::Scalar;
pub use shape::{
    BoxedShape, EnumerationShape, Member, OptionalShape, RecordShape, ScalarShape, SequenceShape,
    Shape,
};

// -----------------------------------------------------------------------------
// Auto registration

/// Submits types for [`TypeCatalog::auto_register`].
///
/// Only non-generic types can be submitted. Without the `auto_register`
/// feature the macro expands to nothing.
///
/// # Examples
///
/// ```
/// use vc_codec::auto_register;
/// use vc_codec::describe::{Describe, Descriptor};
///
/// #[derive(Clone, PartialEq)]
/// enum Mode {
///     Fast,
///     Safe,
/// }
///
/// impl Describe for Mode {
///     fn describe() -> Descriptor {
///         Descriptor::enumeration::<Self>()
///             .variant("Fast", Mode::Fast)
///             .variant("Safe", Mode::Safe)
///             .build()
///     }
/// }
///
/// auto_register!(Mode);
/// # fn main() {}
/// ```
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! auto_register {
    ($($ty:ty),+ $(,)?) => {
        $(
            $crate::__macro_exports::inventory::submit! {
                $crate::__macro_exports::AutoRegister(
                    $crate::describe::TypeCatalog::register::<$ty>
                )
            }
        )+
    };
}

/// Submits types for [`TypeCatalog::auto_register`].
///
/// The `auto_register` feature is disabled, so this expands to nothing.
#[cfg(not(feature = "auto_register"))]
#[macro_export]
macro_rules! auto_register {
    ($($ty:ty),+ $(,)?) => {};
}
