use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

use super::{mismatch, wrapped_key};
use crate::describe::{OptionalShape, Shape};
use crate::error::{CodecError, ResolveError};
use crate::handler::{Constructor, Decoder, Encoder, Validator};
use crate::key::Type;
use crate::registry::{Category, Constructors, Context, Decoders, Encoders, Factory, Validators};
use crate::value::Value;

/// Handlers for `Option<T>`.
///
/// `None` encodes to [`Value::Empty`], which a record leaves out of its map;
/// absent input decodes to `None`. Value constraints such as
/// [`Tag::Range`](crate::Tag::Range) on the option apply to `T`.
pub struct OptionalFactory;

fn optional<C: Category>(ctx: &Context<'_, C>) -> Option<(Type, OptionalShape)> {
    let descriptor = ctx.descriptor()?;
    match descriptor.shape() {
        Shape::Optional(shape) => Some((descriptor.ty(), *shape)),
        _ => None,
    }
}

/// The context of the `T` inside `Option<T>`.
fn inner_context<'a, C: Category>(ctx: &Context<'a, C>, shape: &OptionalShape) -> Context<'a, C> {
    ctx.with_type(wrapped_key(shape.inner(), ctx.key()))
}

impl Factory<Encoders> for OptionalFactory {
    fn create(&self, ctx: &Context<'_, Encoders>) -> Result<Option<Arc<dyn Encoder>>, ResolveError> {
        let Some((ty, shape)) = optional(ctx) else {
            return Ok(None);
        };
        let inner = inner_context(ctx, &shape).force_resolve()?;
        Ok(Some(Arc::new(OptionalEncoder { ty, shape, inner })))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("optional")
    }
}

impl Factory<Decoders> for OptionalFactory {
    fn create(&self, ctx: &Context<'_, Decoders>) -> Result<Option<Arc<dyn Decoder>>, ResolveError> {
        let Some((_, shape)) = optional(ctx) else {
            return Ok(None);
        };
        let inner = inner_context(ctx, &shape).force_resolve()?;
        Ok(Some(Arc::new(OptionalDecoder { shape, inner })))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("optional")
    }
}

impl Factory<Validators> for OptionalFactory {
    fn create(
        &self,
        ctx: &Context<'_, Validators>,
    ) -> Result<Option<Arc<dyn Validator>>, ResolveError> {
        let Some((ty, shape)) = optional(ctx) else {
            return Ok(None);
        };
        // Nothing to check when `T` has no validator.
        let Some(inner) = inner_context(ctx, &shape).try_resolve()? else {
            return Ok(None);
        };
        Ok(Some(Arc::new(OptionalValidator { ty, shape, inner })))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("optional")
    }
}

impl Factory<Constructors> for OptionalFactory {
    fn create(
        &self,
        ctx: &Context<'_, Constructors>,
    ) -> Result<Option<Arc<dyn Constructor>>, ResolveError> {
        Ok(optional(ctx).map(|(ty, shape)| {
            Arc::new(OptionalConstructor { ty, shape }) as Arc<dyn Constructor>
        }))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("optional")
    }
}

pub struct OptionalEncoder {
    ty: Type,
    shape: OptionalShape,
    inner: Arc<dyn Encoder>,
}

impl Encoder for OptionalEncoder {
    fn encode(&self, value: &dyn Any) -> Result<Value, CodecError> {
        match self.shape.get(value) {
            Some(Some(inner)) => self.inner.encode(inner),
            Some(None) => Ok(Value::Empty),
            None => Err(mismatch(self.ty)),
        }
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("optional({})", self.inner.label()))
    }
}

pub struct OptionalDecoder {
    shape: OptionalShape,
    inner: Arc<dyn Decoder>,
}

impl Decoder for OptionalDecoder {
    fn decode(&self, input: &Value) -> Result<Box<dyn Any>, CodecError> {
        if input.is_empty() {
            return Ok(self.shape.none());
        }
        self.shape.some(self.inner.decode(input)?)
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("optional({})", self.inner.label()))
    }
}

pub struct OptionalValidator {
    ty: Type,
    shape: OptionalShape,
    inner: Arc<dyn Validator>,
}

impl Validator for OptionalValidator {
    fn validate(&self, value: &dyn Any) -> Result<(), CodecError> {
        match self.shape.get(value) {
            Some(Some(inner)) => self.inner.validate(inner),
            Some(None) => Ok(()),
            None => Err(mismatch(self.ty)),
        }
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("optional({})", self.inner.label()))
    }
}

/// Creates `None`.
pub struct OptionalConstructor {
    ty: Type,
    shape: OptionalShape,
}

impl Constructor for OptionalConstructor {
    #[inline]
    fn construct(&self) -> Result<Box<dyn Any>, CodecError> {
        Ok(self.shape.none())
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("none `{}`", self.ty))
    }
}
