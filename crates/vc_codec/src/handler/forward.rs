use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock};

use super::{Codec, Constructor, Decoder, Encoder, Populator, Validator};
use crate::error::CodecError;
use crate::key::TypeKey;
use crate::value::Value;

/// A stand-in handler for a type key that is still being resolved.
///
/// The registry hands a `Forward` to every nested request for a key that is
/// already in flight, which is how a self-referential type resolves without
/// unbounded recursion. All holders share the same `Arc`, so once the outer
/// resolution binds the target, every holder dispatches to it.
///
/// The binding happens at most once. If the outer resolution fails the handle
/// stays unbound forever and every invocation returns
/// [`CodecError::Unresolved`].
///
/// A bound handle keeps its target alive, so a recursive handler graph forms a
/// reference cycle and lives as long as the last handle to it.
pub struct Forward<H: ?Sized> {
    key: TypeKey,
    target: OnceLock<Arc<H>>,
}

impl<H: ?Sized> Forward<H> {
    pub(crate) fn new(key: TypeKey) -> Self {
        Self {
            key,
            target: OnceLock::new(),
        }
    }

    /// The key this handle stands in for.
    #[inline]
    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    /// Returns `true` once the resolution has completed successfully.
    #[inline]
    pub fn is_bound(&self) -> bool {
        self.target.get().is_some()
    }

    pub(crate) fn bind(&self, target: Arc<H>) {
        let bound = self.target.set(target).is_ok();
        debug_assert!(bound, "forwarding handle for `{}` bound twice", self.key);
    }

    /// Returns the bound target.
    pub fn target(&self) -> Result<&Arc<H>, CodecError> {
        self.target.get().ok_or_else(|| CodecError::Unresolved {
            key: self.key.clone(),
        })
    }

    fn forward_label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("forward({})", self.key))
    }
}

impl<H: ?Sized> fmt::Debug for Forward<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Forward")
            .field("key", &self.key)
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl Encoder for Forward<dyn Encoder> {
    #[inline]
    fn encode(&self, value: &dyn Any) -> Result<Value, CodecError> {
        self.target()?.encode(value)
    }

    fn label(&self) -> Cow<'_, str> {
        self.forward_label()
    }
}

impl Decoder for Forward<dyn Decoder> {
    #[inline]
    fn decode(&self, input: &Value) -> Result<Box<dyn Any>, CodecError> {
        self.target()?.decode(input)
    }

    fn label(&self) -> Cow<'_, str> {
        self.forward_label()
    }
}

impl Codec for Forward<dyn Codec> {
    #[inline]
    fn encode(&self, value: &dyn Any) -> Result<Value, CodecError> {
        self.target()?.encode(value)
    }

    #[inline]
    fn decode(&self, input: &Value) -> Result<Box<dyn Any>, CodecError> {
        self.target()?.decode(input)
    }

    fn label(&self) -> Cow<'_, str> {
        self.forward_label()
    }
}

impl Validator for Forward<dyn Validator> {
    #[inline]
    fn validate(&self, value: &dyn Any) -> Result<(), CodecError> {
        self.target()?.validate(value)
    }

    fn label(&self) -> Cow<'_, str> {
        self.forward_label()
    }
}

impl Constructor for Forward<dyn Constructor> {
    #[inline]
    fn construct(&self) -> Result<Box<dyn Any>, CodecError> {
        self.target()?.construct()
    }

    fn label(&self) -> Cow<'_, str> {
        self.forward_label()
    }
}

impl Populator for Forward<dyn Populator> {
    #[inline]
    fn populate(&self, target: &mut dyn Any, input: &Value) -> Result<(), CodecError> {
        self.target()?.populate(target, input)
    }

    fn label(&self) -> Cow<'_, str> {
        self.forward_label()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::Forward;
    use crate::error::CodecError;
    use crate::handler::{Encoder, FnEncoder};
    use crate::key::TypeKey;
    use crate::value::Value;

    #[test]
    fn unbound_handle_reports_key() {
        let handle: Forward<dyn Encoder> = Forward::new(TypeKey::of::<u8>());
        let error = handle.encode(&1_u8).unwrap_err();
        assert!(matches!(error, CodecError::Unresolved { ref key } if key.is::<u8>()));
        assert_eq!(handle.label(), "forward(u8)");
    }

    #[test]
    fn holders_see_the_binding() {
        let handle: Arc<Forward<dyn Encoder>> = Arc::new(Forward::new(TypeKey::of::<u8>()));
        let holder: Arc<dyn Encoder> = handle.clone();

        handle.bind(Arc::new(FnEncoder::new(|v: &u8| Ok(Value::from(*v)))));

        assert!(handle.is_bound());
        assert_eq!(holder.encode(&7_u8).unwrap(), Value::from(7));
    }
}
