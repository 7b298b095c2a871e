use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

use log::trace;

use crate::error::{CodecError, ResolveError};
use crate::handler::{Constructor, Decoder};
use crate::registry::{Constructors, Context, Decoders, Factory, Validators};
use crate::value::Value;

/// Substitutes the [`Tag::Default`](crate::Tag::Default) value for absent input.
///
/// A decorator: it only applies to keys carrying a default, and wraps the
/// decoder the rest of the chain produces for the same key. The default is
/// decoded and validated once, at resolution time, and a default the plain
/// decoder rejects is a [`ResolveError::Broken`].
///
/// As a constructor factory it builds values by decoding the default.
pub struct DefaultValueFactory;

impl Factory<Decoders> for DefaultValueFactory {
    fn create(&self, ctx: &Context<'_, Decoders>) -> Result<Option<Arc<dyn Decoder>>, ResolveError> {
        let Some(default) = ctx.key().tags().default_value() else {
            return Ok(None);
        };
        let Some(plain) = ctx.try_resolve_fallback(self)? else {
            return Ok(None);
        };

        let checked = plain.decode(default).and_then(|value| {
            match ctx.category::<Validators>().try_resolve()? {
                Some(validator) => validator.validate(&*value),
                None => Ok(()),
            }
        });
        if let Err(error) = checked {
            match error.innermost() {
                // Part of the handler graph is still being resolved, possibly
                // below a field or an index; the default is checked on first
                // use instead.
                CodecError::Unresolved { key } => {
                    trace!("cannot check the default of `{}` yet, `{key}` is in flight", ctx.key());
                }
                _ => {
                    return Err(ResolveError::broken(
                        ctx.key(),
                        format!("default value {default} is rejected: {error}"),
                    ));
                }
            }
        }

        Ok(Some(Arc::new(DefaultingDecoder {
            plain,
            default: default.clone(),
        })))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("default value")
    }
}

impl Factory<Constructors> for DefaultValueFactory {
    fn create(
        &self,
        ctx: &Context<'_, Constructors>,
    ) -> Result<Option<Arc<dyn Constructor>>, ResolveError> {
        let Some(default) = ctx.key().tags().default_value() else {
            return Ok(None);
        };
        let Some(decoder) = ctx.category::<Decoders>().try_resolve()? else {
            return Ok(None);
        };
        Ok(Some(Arc::new(DefaultConstructor {
            decoder,
            default: default.clone(),
        })))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("default value")
    }
}

/// Decodes the default in place of [`Value::Empty`].
pub struct DefaultingDecoder {
    plain: Arc<dyn Decoder>,
    default: Value,
}

impl Decoder for DefaultingDecoder {
    fn decode(&self, input: &Value) -> Result<Box<dyn Any>, CodecError> {
        if input.is_empty() {
            self.plain.decode(&self.default)
        } else {
            self.plain.decode(input)
        }
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{} (default {})", self.plain.label(), self.default))
    }
}

/// Creates values by decoding the default.
pub struct DefaultConstructor {
    decoder: Arc<dyn Decoder>,
    default: Value,
}

impl Constructor for DefaultConstructor {
    #[inline]
    fn construct(&self) -> Result<Box<dyn Any>, CodecError> {
        self.decoder.decode(&self.default)
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("default {}", self.default))
    }
}
