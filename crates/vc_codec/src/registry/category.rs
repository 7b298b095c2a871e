use std::borrow::Cow;
use std::sync::Arc;

use super::{Context, Registry};
use crate::error::ResolveError;
use crate::handler::{
    Codec, Constructor, Decoder, Encoder, Forward, Populator, ValidatingCodec, ValidatingDecoder,
    ValidatingEncoder, Validator,
};
use crate::handlers::Handlers;
use crate::key::{KeyStrategy, Ordered, Unordered};

// -----------------------------------------------------------------------------
// Category

/// One independent resolution space.
///
/// A category names its handler trait object, how its registry compares
/// keys, and where the facade keeps its registry. Categories are
/// uninhabited marker types, used only as type parameters.
pub trait Category: Sized + Send + Sync + 'static {
    /// The handler trait object, such as `dyn Encoder`.
    type Handler: ?Sized + Send + Sync + 'static;

    /// How this category's cache compares keys.
    type Strategy: KeyStrategy;

    /// A short name for diagnostics.
    const NAME: &'static str;

    fn registry(handlers: &Handlers) -> &Registry<Self>;

    fn registry_mut(handlers: &mut Handlers) -> &mut Registry<Self>;

    /// Views a forwarding handle as a handler of this category.
    fn forward(handle: Arc<Forward<Self::Handler>>) -> Arc<Self::Handler>;

    /// The handler's diagnostic label.
    fn label(handler: &Self::Handler) -> Cow<'_, str>;

    /// Wraps a freshly resolved handler before it is cached.
    ///
    /// Runs once per key, after the factory chain succeeded.
    #[inline]
    fn layer(
        ctx: &Context<'_, Self>,
        handler: Arc<Self::Handler>,
    ) -> Result<Arc<Self::Handler>, ResolveError> {
        let _ = ctx;
        Ok(handler)
    }
}

/// Resolves the validator for the context's key, if any.
#[inline]
fn validator_for<C: Category>(
    ctx: &Context<'_, C>,
) -> Result<Option<Arc<dyn Validator>>, ResolveError> {
    ctx.category::<Validators>().try_resolve()
}

// -----------------------------------------------------------------------------
// Markers

/// Application value to wire value.
pub enum Encoders {}

impl Category for Encoders {
    type Handler = dyn Encoder;
    type Strategy = Ordered;
    const NAME: &'static str = "encoder";

    #[inline]
    fn registry(handlers: &Handlers) -> &Registry<Self> {
        &handlers.encoders
    }

    #[inline]
    fn registry_mut(handlers: &mut Handlers) -> &mut Registry<Self> {
        &mut handlers.encoders
    }

    #[inline]
    fn forward(handle: Arc<Forward<dyn Encoder>>) -> Arc<dyn Encoder> {
        handle
    }

    #[inline]
    fn label(handler: &Self::Handler) -> Cow<'_, str> {
        handler.label()
    }

    fn layer(
        ctx: &Context<'_, Self>,
        handler: Arc<dyn Encoder>,
    ) -> Result<Arc<dyn Encoder>, ResolveError> {
        Ok(match validator_for(ctx)? {
            Some(validator) => Arc::new(ValidatingEncoder::new(handler, validator)),
            None => handler,
        })
    }
}

/// Wire value to application value.
pub enum Decoders {}

impl Category for Decoders {
    type Handler = dyn Decoder;
    type Strategy = Ordered;
    const NAME: &'static str = "decoder";

    #[inline]
    fn registry(handlers: &Handlers) -> &Registry<Self> {
        &handlers.decoders
    }

    #[inline]
    fn registry_mut(handlers: &mut Handlers) -> &mut Registry<Self> {
        &mut handlers.decoders
    }

    #[inline]
    fn forward(handle: Arc<Forward<dyn Decoder>>) -> Arc<dyn Decoder> {
        handle
    }

    #[inline]
    fn label(handler: &Self::Handler) -> Cow<'_, str> {
        handler.label()
    }

    fn layer(
        ctx: &Context<'_, Self>,
        handler: Arc<dyn Decoder>,
    ) -> Result<Arc<dyn Decoder>, ResolveError> {
        Ok(match validator_for(ctx)? {
            Some(validator) => Arc::new(ValidatingDecoder::new(handler, validator)),
            None => handler,
        })
    }
}

/// Both directions at once.
pub enum Codecs {}

impl Category for Codecs {
    type Handler = dyn Codec;
    type Strategy = Ordered;
    const NAME: &'static str = "codec";

    #[inline]
    fn registry(handlers: &Handlers) -> &Registry<Self> {
        &handlers.codecs
    }

    #[inline]
    fn registry_mut(handlers: &mut Handlers) -> &mut Registry<Self> {
        &mut handlers.codecs
    }

    #[inline]
    fn forward(handle: Arc<Forward<dyn Codec>>) -> Arc<dyn Codec> {
        handle
    }

    #[inline]
    fn label(handler: &Self::Handler) -> Cow<'_, str> {
        handler.label()
    }

    fn layer(
        ctx: &Context<'_, Self>,
        handler: Arc<dyn Codec>,
    ) -> Result<Arc<dyn Codec>, ResolveError> {
        if handler.is_validated() {
            return Ok(handler);
        }
        Ok(match validator_for(ctx)? {
            Some(validator) => Arc::new(ValidatingCodec::new(handler, validator)),
            None => handler,
        })
    }
}

/// Accept or reject an application value.
///
/// Validation does not depend on where a tag was written, so this registry
/// ignores tag order.
pub enum Validators {}

impl Category for Validators {
    type Handler = dyn Validator;
    type Strategy = Unordered;
    const NAME: &'static str = "validator";

    #[inline]
    fn registry(handlers: &Handlers) -> &Registry<Self> {
        &handlers.validators
    }

    #[inline]
    fn registry_mut(handlers: &mut Handlers) -> &mut Registry<Self> {
        &mut handlers.validators
    }

    #[inline]
    fn forward(handle: Arc<Forward<dyn Validator>>) -> Arc<dyn Validator> {
        handle
    }

    #[inline]
    fn label(handler: &Self::Handler) -> Cow<'_, str> {
        handler.label()
    }
}

/// Create a bare application value.
pub enum Constructors {}

impl Category for Constructors {
    type Handler = dyn Constructor;
    type Strategy = Ordered;
    const NAME: &'static str = "constructor";

    #[inline]
    fn registry(handlers: &Handlers) -> &Registry<Self> {
        &handlers.constructors
    }

    #[inline]
    fn registry_mut(handlers: &mut Handlers) -> &mut Registry<Self> {
        &mut handlers.constructors
    }

    #[inline]
    fn forward(handle: Arc<Forward<dyn Constructor>>) -> Arc<dyn Constructor> {
        handle
    }

    #[inline]
    fn label(handler: &Self::Handler) -> Cow<'_, str> {
        handler.label()
    }
}

/// Fill an existing application value in place.
pub enum Populators {}

impl Category for Populators {
    type Handler = dyn Populator;
    type Strategy = Ordered;
    const NAME: &'static str = "populator";

    #[inline]
    fn registry(handlers: &Handlers) -> &Registry<Self> {
        &handlers.populators
    }

    #[inline]
    fn registry_mut(handlers: &mut Handlers) -> &mut Registry<Self> {
        &mut handlers.populators
    }

    #[inline]
    fn forward(handle: Arc<Forward<dyn Populator>>) -> Arc<dyn Populator> {
        handle
    }

    #[inline]
    fn label(handler: &Self::Handler) -> Cow<'_, str> {
        handler.label()
    }
}
