//! The standard factories.
//!
//! ## Menu
//!
//! Leaf factories, driven by the [`TypeCatalog`](crate::describe::TypeCatalog):
//!
//! - [`ScalarFactory`]: native codecs for [`Scalar`](crate::describe::Scalar) types.
//! - [`OptionalFactory`]: `Option<T>`, absent on the wire when `None`.
//! - [`BoxedFactory`]: `Box<T>`, transparent on the wire.
//! - [`SequenceFactory`]: `Vec<T>` as a list.
//! - [`EnumerationFactory`]: fieldless enums by variant name.
//! - [`RecordFactory`]: records as maps, decoded by construct + populate.
//!
//! Decorators, which wrap whatever the rest of the chain produces:
//!
//! - [`DefaultValueFactory`]: substitutes [`Tag::Default`] for absent input.
//! - [`RangeFactory`]: checks [`Tag::Range`].
//! - [`NonEmptyFactory`]: checks [`Tag::NonEmpty`].
//!
//! Others:
//!
//! - [`CustomFactory`]: handlers registered for specific types.
//! - [`ComposeFactory`]: codecs from an encoder and a decoder.
//!
//! [`Handlers::new`](crate::Handlers::new) installs all of them in their
//! standard order.

// -----------------------------------------------------------------------------
// Modules

mod boxed;
mod checks;
mod compose;
mod custom;
mod defaults;
mod enumeration;
mod optional;
mod record;
mod scalar;
mod sequence;

// -----------------------------------------------------------------------------
// Exports

pub use boxed::BoxedFactory;
pub use checks::{NonEmptyFactory, RangeFactory};
pub use compose::ComposeFactory;
pub use custom::CustomFactory;
pub use defaults::DefaultValueFactory;
pub use enumeration::EnumerationFactory;
pub use optional::OptionalFactory;
pub use record::RecordFactory;
pub use scalar::ScalarFactory;
pub use sequence::SequenceFactory;

use std::borrow::Cow;

use crate::error::CodecError;
use crate::key::{Tag, Type, TypeKey};

// -----------------------------------------------------------------------------
// Helpers

#[inline]
fn mismatch(ty: Type) -> CodecError {
    CodecError::TypeMismatch {
        expected: Cow::Borrowed(ty.path()),
    }
}

/// The key of a type wrapped by a transparent wrapper such as `Option<T>`.
///
/// Tags that constrain the value carry over to the wrapped type, tags that
/// describe the use site itself stay with the wrapper.
fn wrapped_key(inner: Type, outer: &TypeKey) -> TypeKey {
    let tags = outer
        .tags()
        .iter()
        .filter(|tag| matches!(tag, Tag::Range(_) | Tag::NonEmpty | Tag::Custom(_)))
        .cloned()
        .collect();
    TypeKey::new(inner, tags)
}
