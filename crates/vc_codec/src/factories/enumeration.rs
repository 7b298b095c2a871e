use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

use super::mismatch;
use crate::describe::{EnumerationShape, Shape};
use crate::error::{CodecError, ResolveError};
use crate::handler::{Decoder, Encoder};
use crate::key::Type;
use crate::registry::{Category, Context, Decoders, Encoders, Factory};
use crate::value::{Value, ValueKind};

/// Handlers for fieldless enums, as the variant name.
pub struct EnumerationFactory;

fn enumeration<C: Category>(ctx: &Context<'_, C>) -> Option<EnumerationCodec> {
    let descriptor = ctx.descriptor()?;
    match descriptor.shape() {
        Shape::Enumeration(shape) => Some(EnumerationCodec {
            ty: descriptor.ty(),
            shape: shape.clone(),
        }),
        _ => None,
    }
}

impl Factory<Encoders> for EnumerationFactory {
    fn create(&self, ctx: &Context<'_, Encoders>) -> Result<Option<Arc<dyn Encoder>>, ResolveError> {
        Ok(enumeration(ctx).map(|codec| Arc::new(codec) as Arc<dyn Encoder>))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("enumeration")
    }
}

impl Factory<Decoders> for EnumerationFactory {
    fn create(&self, ctx: &Context<'_, Decoders>) -> Result<Option<Arc<dyn Decoder>>, ResolveError> {
        Ok(enumeration(ctx).map(|codec| Arc::new(codec) as Arc<dyn Decoder>))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("enumeration")
    }
}

pub struct EnumerationCodec {
    ty: Type,
    shape: EnumerationShape,
}

impl Encoder for EnumerationCodec {
    fn encode(&self, value: &dyn Any) -> Result<Value, CodecError> {
        match self.shape.name_of(value) {
            Some(name) => Ok(Value::from(name)),
            None if value.type_id() == self.ty.id() => Err(CodecError::invalid(format!(
                "variant of `{}` was not described",
                self.ty
            ))),
            None => Err(mismatch(self.ty)),
        }
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("enumeration `{}`", self.ty))
    }
}

impl Decoder for EnumerationCodec {
    fn decode(&self, input: &Value) -> Result<Box<dyn Any>, CodecError> {
        let name = input.as_str().ok_or(CodecError::UnexpectedKind {
            expected: ValueKind::String,
            found: input.kind(),
        })?;
        self.shape
            .make(name)
            .ok_or_else(|| CodecError::UnknownVariant {
                variant: name.to_owned(),
                expected: self.shape.names().to_vec(),
            })
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("enumeration `{}`", self.ty))
    }
}
