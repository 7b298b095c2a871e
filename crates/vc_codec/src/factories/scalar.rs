use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

use crate::describe::{ScalarShape, Shape};
use crate::error::{CodecError, ResolveError};
use crate::handler::{Codec, Constructor, Decoder, Encoder};
use crate::key::Type;
use crate::registry::{Category, Constructors, Context, Decoders, Encoders, Factory};
use crate::value::Value;

/// Native handlers for [`Scalar`](crate::describe::Scalar) types.
///
/// The encoder and decoder it builds are one object, so
/// [`as_codec`](Encoder::as_codec) hands it out as a codec directly.
pub struct ScalarFactory;

fn scalar<C: Category>(ctx: &Context<'_, C>) -> Option<(Type, ScalarShape)> {
    let descriptor = ctx.descriptor()?;
    match descriptor.shape() {
        Shape::Scalar(shape) => Some((descriptor.ty(), *shape)),
        _ => None,
    }
}

impl Factory<Encoders> for ScalarFactory {
    fn create(&self, ctx: &Context<'_, Encoders>) -> Result<Option<Arc<dyn Encoder>>, ResolveError> {
        Ok(scalar(ctx).map(|(ty, shape)| Arc::new(ScalarCodec { ty, shape }) as Arc<dyn Encoder>))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("scalar")
    }
}

impl Factory<Decoders> for ScalarFactory {
    fn create(&self, ctx: &Context<'_, Decoders>) -> Result<Option<Arc<dyn Decoder>>, ResolveError> {
        Ok(scalar(ctx).map(|(ty, shape)| Arc::new(ScalarCodec { ty, shape }) as Arc<dyn Decoder>))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("scalar")
    }
}

impl Factory<Constructors> for ScalarFactory {
    fn create(
        &self,
        ctx: &Context<'_, Constructors>,
    ) -> Result<Option<Arc<dyn Constructor>>, ResolveError> {
        Ok(scalar(ctx)
            .map(|(ty, shape)| Arc::new(ScalarConstructor { ty, shape }) as Arc<dyn Constructor>))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("scalar")
    }
}

/// Encodes and decodes a scalar.
pub struct ScalarCodec {
    ty: Type,
    shape: ScalarShape,
}

impl Encoder for ScalarCodec {
    #[inline]
    fn encode(&self, value: &dyn Any) -> Result<Value, CodecError> {
        self.shape.encode(value)
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("scalar `{}`", self.ty))
    }

    #[inline]
    fn as_codec(self: Arc<Self>) -> Option<Arc<dyn Codec>> {
        Some(self)
    }
}

impl Decoder for ScalarCodec {
    #[inline]
    fn decode(&self, input: &Value) -> Result<Box<dyn Any>, CodecError> {
        self.shape.decode(input)
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("scalar `{}`", self.ty))
    }

    #[inline]
    fn as_codec(self: Arc<Self>) -> Option<Arc<dyn Codec>> {
        Some(self)
    }
}

impl Codec for ScalarCodec {
    #[inline]
    fn encode(&self, value: &dyn Any) -> Result<Value, CodecError> {
        self.shape.encode(value)
    }

    #[inline]
    fn decode(&self, input: &Value) -> Result<Box<dyn Any>, CodecError> {
        self.shape.decode(input)
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("scalar `{}`", self.ty))
    }
}

/// Creates the [`zero`](crate::describe::Scalar::zero) of a scalar.
pub struct ScalarConstructor {
    ty: Type,
    shape: ScalarShape,
}

impl Constructor for ScalarConstructor {
    #[inline]
    fn construct(&self) -> Result<Box<dyn Any>, CodecError> {
        Ok(self.shape.zero())
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("zero `{}`", self.ty))
    }
}
