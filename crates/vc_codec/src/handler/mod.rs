//! Handler traits, one per category, and the wrappers the engine builds from them.
//!
//! ## Menu
//!
//! - [`Encoder`]: application value to [`Value`].
//! - [`Decoder`]: [`Value`] to application value.
//! - [`Codec`]: both directions.
//! - [`Validator`]: accept or reject an application value.
//! - [`Constructor`]: create a bare application value.
//! - [`Populator`]: fill an existing application value from a [`Value`].
//! - [`Forward`]: stand-in handler for a type that is still being resolved.
//! - [`ValidatingEncoder`], [`ValidatingDecoder`], [`ValidatingCodec`]: validation layering.
//! - [`PairCodec`]: a codec made of an independent encoder and decoder.
//! - [`FnEncoder`], [`FnDecoder`], [`FnValidator`], [`FnConstructor`]: handlers from typed closures.
//!
//! Application values are passed type-erased as [`Any`]. Handlers are immutable
//! once built and are shared through [`Arc`].

// -----------------------------------------------------------------------------
// Modules

mod forward;
mod func;
mod pair;
mod validating;

// -----------------------------------------------------------------------------
// Exports

pub use forward::Forward;
pub use func::{FnConstructor, FnDecoder, FnEncoder, FnValidator};
pub use pair::PairCodec;
pub use validating::{ValidatingCodec, ValidatingDecoder, ValidatingEncoder};

use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

use crate::error::CodecError;
use crate::value::Value;

// -----------------------------------------------------------------------------
// Handler traits

/// Turns an application value into a wire [`Value`].
pub trait Encoder: Send + Sync + 'static {
    fn encode(&self, value: &dyn Any) -> Result<Value, CodecError>;

    /// A short diagnostic description.
    fn label(&self) -> Cow<'_, str>;

    /// Returns this handler as a [`Codec`] if it also decodes.
    fn as_codec(self: Arc<Self>) -> Option<Arc<dyn Codec>> {
        None
    }
}

/// Turns a wire [`Value`] into an application value.
///
/// Decoders receive [`Value::Empty`] when the input is absent.
pub trait Decoder: Send + Sync + 'static {
    fn decode(&self, input: &Value) -> Result<Box<dyn Any>, CodecError>;

    /// A short diagnostic description.
    fn label(&self) -> Cow<'_, str>;

    /// Returns this handler as a [`Codec`] if it also encodes.
    fn as_codec(self: Arc<Self>) -> Option<Arc<dyn Codec>> {
        None
    }
}

/// Encodes and decodes.
pub trait Codec: Send + Sync + 'static {
    fn encode(&self, value: &dyn Any) -> Result<Value, CodecError>;

    fn decode(&self, input: &Value) -> Result<Box<dyn Any>, CodecError>;

    /// A short diagnostic description.
    fn label(&self) -> Cow<'_, str>;

    /// Returns `true` if validation is already applied in both directions.
    ///
    /// The codec registry skips validation layering for such codecs.
    fn is_validated(&self) -> bool {
        false
    }
}

/// Accepts or rejects an application value.
pub trait Validator: Send + Sync + 'static {
    fn validate(&self, value: &dyn Any) -> Result<(), CodecError>;

    /// A short diagnostic description.
    fn label(&self) -> Cow<'_, str>;
}

/// Creates a bare application value.
pub trait Constructor: Send + Sync + 'static {
    fn construct(&self) -> Result<Box<dyn Any>, CodecError>;

    /// A short diagnostic description.
    fn label(&self) -> Cow<'_, str>;
}

/// Fills an existing application value from a wire [`Value`], in place.
pub trait Populator: Send + Sync + 'static {
    fn populate(&self, target: &mut dyn Any, input: &Value) -> Result<(), CodecError>;

    /// A short diagnostic description.
    fn label(&self) -> Cow<'_, str>;
}

// -----------------------------------------------------------------------------
// Helpers

/// Downcasts a type-erased value, reporting a [`CodecError::TypeMismatch`] on failure.
#[inline]
pub fn downcast_ref<T: Any>(value: &dyn Any) -> Result<&T, CodecError> {
    value.downcast_ref::<T>().ok_or_else(CodecError::mismatch::<T>)
}

/// Downcasts a type-erased value mutably, reporting a [`CodecError::TypeMismatch`] on failure.
#[inline]
pub fn downcast_mut<T: Any>(value: &mut dyn Any) -> Result<&mut T, CodecError> {
    value.downcast_mut::<T>().ok_or_else(CodecError::mismatch::<T>)
}

/// Unboxes a type-erased value, reporting a [`CodecError::TypeMismatch`] on failure.
#[inline]
pub fn downcast_box<T: Any>(value: Box<dyn Any>) -> Result<T, CodecError> {
    value
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| CodecError::mismatch::<T>())
}
