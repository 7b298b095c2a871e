use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{Category, Context};
use crate::error::ResolveError;

/// A pluggable strategy that may produce a handler for a type key.
///
/// A factory answers one of three ways:
///
/// - `Ok(Some(handler))`: it applies and built a handler. Resolution stops.
/// - `Ok(None)`: it does not apply. The next factory is asked.
/// - `Err(error)`: it applies but cannot work. Resolution stops and fails.
///
/// Factories may re-enter the [`Context`] for nested keys, in the same or
/// another category. A decorator factory calls
/// [`Context::try_resolve_fallback`] with itself to get the handler the rest
/// of the chain would have produced, and wraps it.
///
/// A factory type may implement `Factory<C>` for several categories.
pub trait Factory<C: Category>: Send + Sync + 'static {
    fn create(&self, ctx: &Context<'_, C>) -> Result<Option<Arc<C::Handler>>, ResolveError>;

    /// A short name for diagnostics.
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(core::any::type_name::<Self>())
    }
}

/// A [`Factory`] backed by a closure.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vc_codec::handler::{Encoder, FnEncoder};
/// use vc_codec::registry::{Encoders, FnFactory};
/// use vc_codec::{Handlers, TypeKey, Value};
///
/// let mut handlers = Handlers::empty();
/// handlers.add_factory(FnFactory::<Encoders, _>::new("strings", |ctx| {
///     if !ctx.key().is::<String>() {
///         return Ok(None);
///     }
///     let encoder: Arc<dyn Encoder> =
///         Arc::new(FnEncoder::new(|s: &String| Ok(Value::from(s.as_str()))));
///     Ok(Some(encoder))
/// }));
///
/// let encoder = handlers.resolve::<Encoders>(&TypeKey::of::<String>()).unwrap();
/// assert_eq!(encoder.encode(&String::from("hi")).unwrap(), Value::from("hi"));
/// assert!(handlers.try_resolve::<Encoders>(&TypeKey::of::<i32>()).unwrap().is_none());
/// ```
pub struct FnFactory<C, F> {
    name: Cow<'static, str>,
    func: F,
    _marker: PhantomData<fn() -> C>,
}

impl<C, F> FnFactory<C, F>
where
    C: Category,
    F: Fn(&Context<'_, C>) -> Result<Option<Arc<C::Handler>>, ResolveError>
        + Send
        + Sync
        + 'static,
{
    #[inline]
    pub fn new(name: impl Into<Cow<'static, str>>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
            _marker: PhantomData,
        }
    }
}

impl<C, F> Factory<C> for FnFactory<C, F>
where
    C: Category,
    F: Fn(&Context<'_, C>) -> Result<Option<Arc<C::Handler>>, ResolveError>
        + Send
        + Sync
        + 'static,
{
    #[inline]
    fn create(&self, ctx: &Context<'_, C>) -> Result<Option<Arc<C::Handler>>, ResolveError> {
        (self.func)(ctx)
    }

    fn name(&self) -> Cow<'static, str> {
        self.name.clone()
    }
}
