use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

use super::mismatch;
use crate::describe::{ScalarShape, SequenceShape, Shape};
use crate::error::{CodecError, ResolveError};
use crate::handler::Validator;
use crate::key::{NumberRange, Type};
use crate::registry::{Context, Factory, Validators};

/// Checks [`Tag::Range`](crate::Tag::Range) on numeric scalars.
///
/// Several ranges on one key must all hold, whatever their order.
/// A decorator: the range checks run first, then whatever validator the rest
/// of the chain produces for the same key. On `Option<T>` and `Box<T>` the
/// factory steps aside so the range reaches `T`. On anything else that is not
/// a numeric scalar the tag is a [`ResolveError::Broken`].
pub struct RangeFactory;

impl Factory<Validators> for RangeFactory {
    fn create(
        &self,
        ctx: &Context<'_, Validators>,
    ) -> Result<Option<Arc<dyn Validator>>, ResolveError> {
        let ranges = ctx.key().tags().ranges();
        if ranges.is_empty() {
            return Ok(None);
        }
        let Some(descriptor) = ctx.descriptor() else {
            return Ok(None);
        };
        let shape = match descriptor.shape() {
            Shape::Scalar(shape) if shape.number(&*shape.zero()).is_some() => *shape,
            Shape::Optional(_) | Shape::Boxed(_) => return Ok(None),
            other => {
                return Err(ResolveError::broken(
                    ctx.key(),
                    format!(
                        "a range needs a numeric scalar, `{}` is a {}",
                        descriptor.ty(),
                        other.kind()
                    ),
                ));
            }
        };
        let rest = ctx.try_resolve_fallback(self)?;
        Ok(Some(Arc::new(RangeValidator {
            ty: descriptor.ty(),
            shape,
            ranges,
            rest,
        })))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("range")
    }
}

pub struct RangeValidator {
    ty: Type,
    shape: ScalarShape,
    ranges: Vec<NumberRange>,
    rest: Option<Arc<dyn Validator>>,
}

impl Validator for RangeValidator {
    fn validate(&self, value: &dyn Any) -> Result<(), CodecError> {
        let number = self.shape.number(value).ok_or_else(|| mismatch(self.ty))?;
        if let Some(range) = self.ranges.iter().find(|range| !range.contains(number)) {
            return Err(CodecError::invalid(format!("{number} is outside {range}")));
        }
        match &self.rest {
            Some(rest) => rest.validate(value),
            None => Ok(()),
        }
    }

    fn label(&self) -> Cow<'_, str> {
        let ranges = self
            .ranges
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        match &self.rest {
            Some(rest) => Cow::Owned(format!("range({ranges}) + {}", rest.label())),
            None => Cow::Owned(format!("range({ranges})")),
        }
    }
}

/// Checks [`Tag::NonEmpty`](crate::Tag::NonEmpty) on strings and sequences.
///
/// A decorator like [`RangeFactory`], with the same treatment of wrappers
/// and unsupported shapes.
pub struct NonEmptyFactory;

#[derive(Clone, Copy)]
enum Measure {
    Length(ScalarShape),
    Items(SequenceShape),
}

impl Factory<Validators> for NonEmptyFactory {
    fn create(
        &self,
        ctx: &Context<'_, Validators>,
    ) -> Result<Option<Arc<dyn Validator>>, ResolveError> {
        if !ctx.key().tags().is_non_empty() {
            return Ok(None);
        }
        let Some(descriptor) = ctx.descriptor() else {
            return Ok(None);
        };
        let measure = match descriptor.shape() {
            Shape::Scalar(shape) if shape.length(&*shape.zero()).is_some() => {
                Measure::Length(*shape)
            }
            Shape::Sequence(shape) => Measure::Items(*shape),
            Shape::Optional(_) | Shape::Boxed(_) => return Ok(None),
            other => {
                return Err(ResolveError::broken(
                    ctx.key(),
                    format!(
                        "non-empty needs a string or a sequence, `{}` is a {}",
                        descriptor.ty(),
                        other.kind()
                    ),
                ));
            }
        };
        let rest = ctx.try_resolve_fallback(self)?;
        Ok(Some(Arc::new(NonEmptyValidator {
            ty: descriptor.ty(),
            measure,
            rest,
        })))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("non-empty")
    }
}

pub struct NonEmptyValidator {
    ty: Type,
    measure: Measure,
    rest: Option<Arc<dyn Validator>>,
}

impl Validator for NonEmptyValidator {
    fn validate(&self, value: &dyn Any) -> Result<(), CodecError> {
        let len = match self.measure {
            Measure::Length(shape) => shape.length(value),
            Measure::Items(shape) => shape.items(value).map(|items| items.len()),
        };
        match len {
            Some(0) => return Err(CodecError::invalid("must not be empty")),
            Some(_) => {}
            None => return Err(mismatch(self.ty)),
        }
        match &self.rest {
            Some(rest) => rest.validate(value),
            None => Ok(()),
        }
    }

    fn label(&self) -> Cow<'_, str> {
        match &self.rest {
            Some(rest) => Cow::Owned(format!("non-empty + {}", rest.label())),
            None => Cow::Borrowed("non-empty"),
        }
    }
}
