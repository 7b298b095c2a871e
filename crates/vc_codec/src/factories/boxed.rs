use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

use super::{mismatch, wrapped_key};
use crate::describe::{BoxedShape, Shape};
use crate::error::{CodecError, ResolveError};
use crate::handler::{Constructor, Decoder, Encoder, Validator};
use crate::key::Type;
use crate::registry::{Category, Constructors, Context, Decoders, Encoders, Factory, Validators};
use crate::value::Value;

/// Handlers for `Box<T>`, delegating to the handlers of `T`.
pub struct BoxedFactory;

fn boxed<C: Category>(ctx: &Context<'_, C>) -> Option<(Type, BoxedShape)> {
    let descriptor = ctx.descriptor()?;
    match descriptor.shape() {
        Shape::Boxed(shape) => Some((descriptor.ty(), *shape)),
        _ => None,
    }
}

fn inner_context<'a, C: Category>(ctx: &Context<'a, C>, shape: &BoxedShape) -> Context<'a, C> {
    ctx.with_type(wrapped_key(shape.inner(), ctx.key()))
}

impl Factory<Encoders> for BoxedFactory {
    fn create(&self, ctx: &Context<'_, Encoders>) -> Result<Option<Arc<dyn Encoder>>, ResolveError> {
        let Some((ty, shape)) = boxed(ctx) else {
            return Ok(None);
        };
        let inner = inner_context(ctx, &shape).force_resolve()?;
        Ok(Some(Arc::new(BoxedEncoder { ty, shape, inner })))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("boxed")
    }
}

impl Factory<Decoders> for BoxedFactory {
    fn create(&self, ctx: &Context<'_, Decoders>) -> Result<Option<Arc<dyn Decoder>>, ResolveError> {
        let Some((_, shape)) = boxed(ctx) else {
            return Ok(None);
        };
        let inner = inner_context(ctx, &shape).force_resolve()?;
        Ok(Some(Arc::new(BoxedDecoder { shape, inner })))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("boxed")
    }
}

impl Factory<Validators> for BoxedFactory {
    fn create(
        &self,
        ctx: &Context<'_, Validators>,
    ) -> Result<Option<Arc<dyn Validator>>, ResolveError> {
        let Some((ty, shape)) = boxed(ctx) else {
            return Ok(None);
        };
        let Some(inner) = inner_context(ctx, &shape).try_resolve()? else {
            return Ok(None);
        };
        Ok(Some(Arc::new(BoxedValidator { ty, shape, inner })))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("boxed")
    }
}

impl Factory<Constructors> for BoxedFactory {
    fn create(
        &self,
        ctx: &Context<'_, Constructors>,
    ) -> Result<Option<Arc<dyn Constructor>>, ResolveError> {
        let Some((_, shape)) = boxed(ctx) else {
            return Ok(None);
        };
        let inner = inner_context(ctx, &shape).force_resolve()?;
        Ok(Some(Arc::new(BoxedConstructor { shape, inner })))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("boxed")
    }
}

pub struct BoxedEncoder {
    ty: Type,
    shape: BoxedShape,
    inner: Arc<dyn Encoder>,
}

impl Encoder for BoxedEncoder {
    fn encode(&self, value: &dyn Any) -> Result<Value, CodecError> {
        let inner = self.shape.get(value).ok_or_else(|| mismatch(self.ty))?;
        self.inner.encode(inner)
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("boxed({})", self.inner.label()))
    }
}

pub struct BoxedDecoder {
    shape: BoxedShape,
    inner: Arc<dyn Decoder>,
}

impl Decoder for BoxedDecoder {
    fn decode(&self, input: &Value) -> Result<Box<dyn Any>, CodecError> {
        self.shape.wrap(self.inner.decode(input)?)
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("boxed({})", self.inner.label()))
    }
}

pub struct BoxedValidator {
    ty: Type,
    shape: BoxedShape,
    inner: Arc<dyn Validator>,
}

impl Validator for BoxedValidator {
    fn validate(&self, value: &dyn Any) -> Result<(), CodecError> {
        let inner = self.shape.get(value).ok_or_else(|| mismatch(self.ty))?;
        self.inner.validate(inner)
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("boxed({})", self.inner.label()))
    }
}

pub struct BoxedConstructor {
    shape: BoxedShape,
    inner: Arc<dyn Constructor>,
}

impl Constructor for BoxedConstructor {
    fn construct(&self) -> Result<Box<dyn Any>, CodecError> {
        self.shape.wrap(self.inner.construct()?)
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("boxed({})", self.inner.label()))
    }
}
