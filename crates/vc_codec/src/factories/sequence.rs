use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

use super::mismatch;
use crate::describe::{SequenceShape, Shape};
use crate::error::{CodecError, ResolveError};
use crate::handler::{Constructor, Decoder, Encoder, Validator};
use crate::key::{Tags, Type, TypeKey};
use crate::registry::{Category, Constructors, Context, Decoders, Encoders, Factory, Validators};
use crate::value::{Value, ValueKind};

/// Handlers for `Vec<T>`, as a [`Value::List`].
///
/// Tags on the sequence apply to the sequence itself, elements resolve
/// with the untagged element type.
pub struct SequenceFactory;

fn sequence<C: Category>(ctx: &Context<'_, C>) -> Option<(Type, SequenceShape)> {
    let descriptor = ctx.descriptor()?;
    match descriptor.shape() {
        Shape::Sequence(shape) => Some((descriptor.ty(), *shape)),
        _ => None,
    }
}

fn element_context<'a, C: Category>(ctx: &Context<'a, C>, shape: &SequenceShape) -> Context<'a, C> {
    ctx.with_type(TypeKey::new(shape.element(), Tags::new()))
}

impl Factory<Encoders> for SequenceFactory {
    fn create(&self, ctx: &Context<'_, Encoders>) -> Result<Option<Arc<dyn Encoder>>, ResolveError> {
        let Some((ty, shape)) = sequence(ctx) else {
            return Ok(None);
        };
        let element = element_context(ctx, &shape).force_resolve()?;
        Ok(Some(Arc::new(SequenceEncoder { ty, shape, element })))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("sequence")
    }
}

impl Factory<Decoders> for SequenceFactory {
    fn create(&self, ctx: &Context<'_, Decoders>) -> Result<Option<Arc<dyn Decoder>>, ResolveError> {
        let Some((_, shape)) = sequence(ctx) else {
            return Ok(None);
        };
        let element = element_context(ctx, &shape).force_resolve()?;
        Ok(Some(Arc::new(SequenceDecoder { shape, element })))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("sequence")
    }
}

impl Factory<Validators> for SequenceFactory {
    fn create(
        &self,
        ctx: &Context<'_, Validators>,
    ) -> Result<Option<Arc<dyn Validator>>, ResolveError> {
        let Some((ty, shape)) = sequence(ctx) else {
            return Ok(None);
        };
        let Some(element) = element_context(ctx, &shape).try_resolve()? else {
            return Ok(None);
        };
        Ok(Some(Arc::new(SequenceValidator { ty, shape, element })))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("sequence")
    }
}

impl Factory<Constructors> for SequenceFactory {
    fn create(
        &self,
        ctx: &Context<'_, Constructors>,
    ) -> Result<Option<Arc<dyn Constructor>>, ResolveError> {
        Ok(sequence(ctx).map(|(ty, shape)| {
            Arc::new(SequenceConstructor { ty, shape }) as Arc<dyn Constructor>
        }))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("sequence")
    }
}

pub struct SequenceEncoder {
    ty: Type,
    shape: SequenceShape,
    element: Arc<dyn Encoder>,
}

impl Encoder for SequenceEncoder {
    fn encode(&self, value: &dyn Any) -> Result<Value, CodecError> {
        let items = self.shape.items(value).ok_or_else(|| mismatch(self.ty))?;
        let mut list = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            list.push(self.element.encode(item).map_err(|e| e.at_index(index))?);
        }
        Ok(Value::List(list))
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("sequence({})", self.element.label()))
    }
}

pub struct SequenceDecoder {
    shape: SequenceShape,
    element: Arc<dyn Decoder>,
}

impl Decoder for SequenceDecoder {
    fn decode(&self, input: &Value) -> Result<Box<dyn Any>, CodecError> {
        let list = input.as_list().ok_or(CodecError::UnexpectedKind {
            expected: ValueKind::List,
            found: input.kind(),
        })?;
        let mut items = Vec::with_capacity(list.len());
        for (index, item) in list.iter().enumerate() {
            items.push(self.element.decode(item).map_err(|e| e.at_index(index))?);
        }
        self.shape.collect(items)
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("sequence({})", self.element.label()))
    }
}

pub struct SequenceValidator {
    ty: Type,
    shape: SequenceShape,
    element: Arc<dyn Validator>,
}

impl Validator for SequenceValidator {
    fn validate(&self, value: &dyn Any) -> Result<(), CodecError> {
        let items = self.shape.items(value).ok_or_else(|| mismatch(self.ty))?;
        for (index, item) in items.into_iter().enumerate() {
            self.element.validate(item).map_err(|e| e.at_index(index))?;
        }
        Ok(())
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("sequence({})", self.element.label()))
    }
}

/// Creates an empty sequence.
pub struct SequenceConstructor {
    ty: Type,
    shape: SequenceShape,
}

impl Constructor for SequenceConstructor {
    #[inline]
    fn construct(&self) -> Result<Box<dyn Any>, CodecError> {
        Ok(self.shape.empty())
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("empty `{}`", self.ty))
    }
}
