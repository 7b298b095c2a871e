use std::sync::Arc;

use log::{debug, trace, warn};
use parking_lot::{Mutex, RwLock};

use super::{Category, Context, Factory, stack};
use crate::error::ResolveError;
use crate::factories::CustomFactory;
use crate::handler::Forward;
use crate::handlers::Handlers;
use crate::key::{KeyMap, KeyStrategy, TypeKey, new_key_map};

type CacheKey<C> = <<C as Category>::Strategy as KeyStrategy>::Key;

// -----------------------------------------------------------------------------
// Registry

/// The factory chain, cache and in-flight map of one category.
///
/// # Resolution
///
/// Resolving a key goes through these steps:
///
/// 1. A cached handler is returned as is.
/// 2. A key that is already being resolved yields a [`Forward`] to the
///    pending result. This is what lets a self-referential type resolve.
/// 3. Otherwise the factories are asked in order; the first handler wins and
///    the first error aborts.
/// 4. The winner is passed through [`Category::layer`], bound to the
///    forwarding handle, then cached.
///
/// Failures are never cached: a later request for the same key starts over.
///
/// # Concurrency
///
/// Cache hits only take a read lock. A miss enters the facade's resolution
/// gate, so at most one resolution tree runs at a time; other threads wait
/// for it and then find its results in the cache.
pub struct Registry<C: Category> {
    factories: Vec<Arc<dyn Factory<C>>>,
    custom: Arc<CustomFactory<C>>,
    cache: RwLock<KeyMap<CacheKey<C>, Arc<C::Handler>>>,
    in_flight: Mutex<KeyMap<CacheKey<C>, Arc<Forward<C::Handler>>>>,
}

impl<C: Category> Default for Registry<C> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Category> Registry<C> {
    /// Creates a registry with no factories.
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
            custom: Arc::new(CustomFactory::new()),
            cache: RwLock::new(new_key_map()),
            in_flight: Mutex::new(new_key_map()),
        }
    }

    // -------------------------------------------------------------------------
    // Setup

    /// Appends a factory to the end of the chain.
    #[inline]
    pub fn push(&mut self, factory: Arc<dyn Factory<C>>) {
        self.factories.push(factory);
    }

    /// Appends factories to the end of the chain, in order.
    #[inline]
    pub fn extend(&mut self, factories: impl IntoIterator<Item = Arc<dyn Factory<C>>>) {
        self.factories.extend(factories);
    }

    /// Inserts a factory at the front of the chain, ahead of all others.
    #[inline]
    pub fn push_front(&mut self, factory: Arc<dyn Factory<C>>) {
        self.factories.insert(0, factory);
    }

    /// The factories, in the order they are asked.
    #[inline]
    pub fn factories(&self) -> &[Arc<dyn Factory<C>>] {
        &self.factories
    }

    /// The factory holding handlers registered for specific types.
    ///
    /// It is not part of the chain until pushed; the standard chains of
    /// [`Handlers::new`] include it.
    #[inline]
    pub fn custom(&self) -> &Arc<CustomFactory<C>> {
        &self.custom
    }

    // -------------------------------------------------------------------------
    // Inspection

    /// Returns `true` if a handler for `key` is cached.
    #[inline]
    pub fn is_cached(&self, key: &TypeKey) -> bool {
        self.cache.read().contains_key(&C::Strategy::key(key))
    }

    /// Returns the cached handler for `key` without resolving.
    #[inline]
    pub fn cached(&self, key: &TypeKey) -> Option<Arc<C::Handler>> {
        self.cache.read().get(&C::Strategy::key(key)).cloned()
    }

    /// Returns `true` while `key` is being resolved.
    #[inline]
    pub fn is_in_flight(&self, key: &TypeKey) -> bool {
        self.in_flight.lock().contains_key(&C::Strategy::key(key))
    }

    /// The number of cached handlers.
    #[inline]
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Returns `true` if no handler is cached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    // -------------------------------------------------------------------------
    // Resolution

    /// Resolves `key` through the whole chain, with caching and recursion breaking.
    pub(crate) fn resolve(
        &self,
        handlers: &Handlers,
        key: &TypeKey,
    ) -> Result<Option<Arc<C::Handler>>, ResolveError> {
        let id = C::Strategy::key(key);

        let hit = self.cache.read().get(&id).cloned();
        if let Some(handler) = hit {
            trace!("{} cache hit for `{key}`", C::NAME);
            return Ok(Some(handler));
        }

        let _gate = handlers.gate.lock();

        // Another thread may have finished this key while we waited.
        let hit = self.cache.read().get(&id).cloned();
        if let Some(handler) = hit {
            trace!("{} cache hit for `{key}`", C::NAME);
            return Ok(Some(handler));
        }

        let pending = self.in_flight.lock().get(&id).cloned();
        if let Some(forward) = pending {
            trace!("{} for `{key}` is in flight, handing out a forward", C::NAME);
            return Ok(Some(C::forward(forward)));
        }

        trace!("{} cache miss for `{key}`", C::NAME);
        let forward = Arc::new(Forward::new(key.clone()));
        self.in_flight.lock().insert(id.clone(), forward.clone());

        let outcome = {
            let _in_flight = InFlight {
                registry: self,
                id: &id,
            };
            let _frame = stack::enter(C::NAME, key);
            let ctx = Context::new(handlers, key.clone());
            match self.run_chain(&ctx, 0) {
                Ok(Some(handler)) => C::layer(&ctx, handler).map(Some),
                other => other,
            }
        };

        match outcome {
            Ok(Some(handler)) => {
                forward.bind(handler.clone());
                let handler = self.cache.write().entry(id).or_insert(handler).clone();
                debug!("resolved {} for `{key}`: {}", C::NAME, C::label(&handler));
                Ok(Some(handler))
            }
            Ok(None) => {
                Self::discard(&forward, key);
                Ok(None)
            }
            Err(error) => {
                Self::discard(&forward, key);
                Err(error)
            }
        }
    }

    /// Resolves `key` with the factories after `caller` only.
    ///
    /// The result is not cached under `key`; nested requests made by the
    /// remaining factories still go through [`resolve`](Self::resolve).
    pub(crate) fn resolve_after(
        &self,
        handlers: &Handlers,
        key: &TypeKey,
        caller: &dyn Factory<C>,
    ) -> Result<Option<Arc<C::Handler>>, ResolveError> {
        let start = match self.position(caller) {
            Some(index) => index + 1,
            None => {
                trace!(
                    "`{}` is not in the {} chain, falling back to the whole chain",
                    caller.name(),
                    C::NAME
                );
                0
            }
        };

        let _gate = handlers.gate.lock();
        let ctx = Context::new(handlers, key.clone());
        self.run_chain(&ctx, start)
    }

    /// Asks exactly one factory, outside of the chain and the cache.
    pub(crate) fn resolve_with(
        &self,
        handlers: &Handlers,
        key: &TypeKey,
        factory: &dyn Factory<C>,
    ) -> Result<Option<Arc<C::Handler>>, ResolveError> {
        let _gate = handlers.gate.lock();
        let ctx = Context::new(handlers, key.clone());
        factory
            .create(&ctx)
            .map_err(|error| Self::wrap(error, key, factory))
    }

    fn run_chain(
        &self,
        ctx: &Context<'_, C>,
        start: usize,
    ) -> Result<Option<Arc<C::Handler>>, ResolveError> {
        for factory in self.factories.get(start..).unwrap_or_default() {
            match factory.create(ctx) {
                Ok(Some(handler)) => {
                    trace!(
                        "`{}` built the {} for `{}`",
                        factory.name(),
                        C::NAME,
                        ctx.key()
                    );
                    return Ok(Some(handler));
                }
                Ok(None) => {}
                Err(error) => return Err(Self::wrap(error, ctx.key(), &**factory)),
            }
        }
        Ok(None)
    }

    fn position(&self, caller: &dyn Factory<C>) -> Option<usize> {
        self.factories
            .iter()
            .position(|factory| core::ptr::addr_eq(Arc::as_ptr(factory), caller))
    }

    fn wrap(error: ResolveError, key: &TypeKey, factory: &dyn Factory<C>) -> ResolveError {
        ResolveError::Factory {
            category: C::NAME,
            key: key.clone(),
            factory: factory.name(),
            source: Box::new(error),
        }
    }

    fn discard(forward: &Arc<Forward<C::Handler>>, key: &TypeKey) {
        // The in-flight entry is gone, so any other owner captured the handle.
        if Arc::strong_count(forward) > 1 {
            warn!(
                "{}",
                stack::annotate(format_args!(
                    "resolving the {} for `{key}` failed after a nested request captured \
                     its forwarding handle; invoking that handle will fail",
                    C::NAME
                ))
            );
        }
    }
}

/// Removes the in-flight entry on every exit path, unwinding included.
struct InFlight<'a, C: Category> {
    registry: &'a Registry<C>,
    id: &'a CacheKey<C>,
}

impl<C: Category> Drop for InFlight<'_, C> {
    #[inline]
    fn drop(&mut self) {
        self.registry.in_flight.lock().remove(self.id);
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::borrow::Cow;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use crate::error::{CodecError, ResolveError};
    use crate::handler::{Encoder, FnEncoder};
    use crate::registry::{Context, Encoders, Factory, Validators};
    use crate::{Handlers, Tag, TypeKey, Value};

    /// Encodes `u8` keys, counting how often it is asked.
    struct Counting {
        calls: Arc<AtomicUsize>,
        fail_first: bool,
    }

    impl Counting {
        fn new() -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let factory = Self {
                calls: calls.clone(),
                fail_first: false,
            };
            (factory, calls)
        }
    }

    impl Factory<Encoders> for Counting {
        fn create(&self, ctx: &Context<'_, Encoders>) -> Result<Option<Arc<dyn Encoder>>, ResolveError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if !ctx.key().is::<u8>() {
                return Ok(None);
            }
            if self.fail_first && call == 0 {
                return Err(ResolveError::broken(ctx.key(), "first attempt"));
            }
            Ok(Some(Arc::new(FnEncoder::new(|v: &u8| Ok(Value::from(*v))))))
        }
    }

    /// Encodes any value as the same string.
    struct Fixed(&'static str);

    impl Encoder for Fixed {
        fn encode(&self, _: &dyn std::any::Any) -> Result<Value, CodecError> {
            Ok(Value::from(self.0))
        }

        fn label(&self) -> Cow<'_, str> {
            Cow::Owned(format!("fixed({})", self.0))
        }
    }

    /// Applies to every key.
    struct Constant(&'static str);

    impl Factory<Encoders> for Constant {
        fn create(&self, _: &Context<'_, Encoders>) -> Result<Option<Arc<dyn Encoder>>, ResolveError> {
            Ok(Some(Arc::new(Fixed(self.0))))
        }

        fn name(&self) -> Cow<'static, str> {
            Cow::Borrowed(self.0)
        }
    }

    /// Applies to `u8` keys only.
    struct OnlyU8(&'static str);

    impl Factory<Encoders> for OnlyU8 {
        fn create(&self, ctx: &Context<'_, Encoders>) -> Result<Option<Arc<dyn Encoder>>, ResolveError> {
            if !ctx.key().is::<u8>() {
                return Ok(None);
            }
            Ok(Some(Arc::new(Fixed(self.0))))
        }
    }

    /// Wraps whatever the rest of the chain produces in a list.
    struct Listing;

    struct Listed(Arc<dyn Encoder>);

    impl Encoder for Listed {
        fn encode(&self, value: &dyn std::any::Any) -> Result<Value, CodecError> {
            Ok(Value::list([self.0.encode(value)?]))
        }

        fn label(&self) -> Cow<'_, str> {
            Cow::Owned(format!("listed({})", self.0.label()))
        }
    }

    impl Factory<Encoders> for Listing {
        fn create(&self, ctx: &Context<'_, Encoders>) -> Result<Option<Arc<dyn Encoder>>, ResolveError> {
            Ok(ctx
                .try_resolve_fallback(self)?
                .map(|rest| Arc::new(Listed(rest)) as Arc<dyn Encoder>))
        }
    }

    #[test]
    fn second_request_hits_the_cache() {
        let mut handlers = Handlers::empty();
        let (factory, calls) = Counting::new();
        handlers.add_factory::<Encoders>(factory);
        let key = TypeKey::of::<u8>();

        let first = handlers.resolve::<Encoders>(&key).unwrap();
        let second = handlers.resolve::<Encoders>(&key).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(handlers.registry::<Encoders>().is_cached(&key));
        assert!(!handlers.registry::<Encoders>().is_in_flight(&key));
    }

    #[test]
    fn first_factory_in_order_wins() {
        let mut handlers = Handlers::empty();
        handlers.add_factory::<Encoders>(Constant("back"));
        handlers.add_factory_first::<Encoders>(Constant("front"));

        let value = handlers.encode(&1_u8).unwrap();
        assert_eq!(value, Value::from("front"));
        assert_eq!(handlers.registry::<Encoders>().factories()[1].name(), "back");
    }

    #[test]
    fn later_factory_serves_what_earlier_ones_decline() {
        let mut handlers = Handlers::empty();
        handlers.add_factory::<Encoders>(OnlyU8("narrow"));
        handlers.add_factory::<Encoders>(Constant("wide"));

        assert_eq!(handlers.encode(&1_u8).unwrap(), Value::from("narrow"));
        assert_eq!(handlers.encode(&String::from("x")).unwrap(), Value::from("wide"));
        assert_eq!(handlers.encode(&1_u16).unwrap(), Value::from("wide"));
    }

    #[test]
    fn no_factory_applies() {
        let mut handlers = Handlers::empty();
        let (factory, _) = Counting::new();
        handlers.add_factory::<Encoders>(factory);
        let key = TypeKey::of::<String>();

        assert!(handlers.try_resolve::<Encoders>(&key).unwrap().is_none());
        let error = handlers.resolve::<Encoders>(&key).err().unwrap();
        assert!(error.is_unsatisfiable());
        assert_eq!(error.to_string(), "no encoder available for `String`");
        assert!(!handlers.registry::<Encoders>().is_cached(&key));
    }

    #[test]
    fn failures_are_not_cached() {
        let mut handlers = Handlers::empty();
        let (mut factory, calls) = Counting::new();
        factory.fail_first = true;
        handlers.add_factory::<Encoders>(factory);
        let key = TypeKey::of::<u8>();

        let error = handlers.resolve::<Encoders>(&key).err().unwrap();
        assert!(matches!(error.root_cause(), ResolveError::Broken { .. }));
        assert!(!handlers.registry::<Encoders>().is_cached(&key));

        assert!(handlers.resolve::<Encoders>(&key).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn fallback_skips_the_caller() {
        let mut handlers = Handlers::empty();
        handlers.add_factory::<Encoders>(Listing);
        handlers.add_factory::<Encoders>(Constant("plain"));

        let value = handlers.encode(&1_u8).unwrap();
        assert_eq!(value, Value::list([Value::from("plain")]));

        // A caller outside of the chain falls back to the whole chain.
        let ctx = handlers.context::<Encoders>(TypeKey::of::<u8>());
        let outsider = Constant("outsider");
        let rest = ctx.force_resolve_fallback(&outsider).unwrap();
        assert_eq!(rest.label(), "listed(fixed(plain))");
    }

    #[test]
    fn fallback_equals_resolving_with_the_next_factory() {
        let mut handlers = Handlers::empty();
        handlers.add_factory::<Encoders>(Listing);
        handlers.add_factory::<Encoders>(OnlyU8("narrow"));
        handlers.add_factory::<Encoders>(Constant("wide"));
        let factories = handlers.registry::<Encoders>().factories().to_vec();

        let ctx = handlers.context::<Encoders>(TypeKey::of::<u8>());
        let fallback = ctx.force_resolve_fallback(&*factories[0]).unwrap();
        let with = ctx.force_resolve_with(&*factories[1]).unwrap();
        assert_eq!(fallback.label(), with.label());
        assert_eq!(fallback.encode(&1_u8).unwrap(), with.encode(&1_u8).unwrap());
        assert_eq!(fallback.encode(&1_u8).unwrap(), Value::from("narrow"));

        // Past the narrow factory only the catch-all is left.
        let fallback = ctx.force_resolve_fallback(&*factories[1]).unwrap();
        let with = ctx.force_resolve_with(&*factories[2]).unwrap();
        assert_eq!(fallback.label(), with.label());
        assert_eq!(fallback.encode(&1_u8).unwrap(), Value::from("wide"));
    }

    #[test]
    fn single_factory_results_are_not_cached() {
        let mut handlers = Handlers::empty();
        handlers.add_factory::<Encoders>(Constant("only"));
        let key = TypeKey::of::<u8>();

        let ctx = handlers.context::<Encoders>(key.clone());
        let with = ctx.force_resolve_with(&Constant("one-off")).unwrap();
        assert_eq!(with.encode(&1_u8).unwrap(), Value::from("one-off"));
        assert!(handlers.registry::<Encoders>().is_empty());
    }

    #[test]
    fn nested_request_gets_a_forward() {
        let captured: Arc<Mutex<Option<Arc<dyn Encoder>>>> = Arc::new(Mutex::new(None));
        let slot = captured.clone();

        let mut handlers = Handlers::empty();
        handlers.add_factory(crate::registry::FnFactory::<Encoders, _>::new(
            "self-referential",
            move |ctx: &Context<'_, Encoders>| -> Result<Option<Arc<dyn Encoder>>, ResolveError> {
                *slot.lock() = Some(ctx.force_resolve()?);
                Ok(Some(Arc::new(FnEncoder::new(|v: &u8| Ok(Value::from(*v))))))
            },
        ));

        let encoder = handlers.resolve::<Encoders>(&TypeKey::of::<u8>()).unwrap();
        let nested = captured.lock().clone().unwrap();

        assert_eq!(nested.label(), "forward(u8)");
        assert_eq!(nested.encode(&4_u8).unwrap(), encoder.encode(&4_u8).unwrap());
    }

    #[test]
    fn failed_resolution_leaves_forward_unbound() {
        let captured: Arc<Mutex<Option<Arc<dyn Encoder>>>> = Arc::new(Mutex::new(None));
        let slot = captured.clone();

        let mut handlers = Handlers::empty();
        handlers.add_factory(crate::registry::FnFactory::<Encoders, _>::new(
            "doomed",
            move |ctx: &Context<'_, Encoders>| -> Result<Option<Arc<dyn Encoder>>, ResolveError> {
                *slot.lock() = Some(ctx.force_resolve()?);
                Err(ResolveError::broken(ctx.key(), "gave up"))
            },
        ));

        let key = TypeKey::of::<u8>();
        assert!(handlers.resolve::<Encoders>(&key).is_err());
        assert!(!handlers.registry::<Encoders>().is_in_flight(&key));

        let nested = captured.lock().clone().unwrap();
        let error = nested.encode(&4_u8).unwrap_err();
        assert!(matches!(error, CodecError::Unresolved { ref key } if key.is::<u8>()));
    }

    #[test]
    fn categories_are_independent() {
        let mut handlers = Handlers::empty();
        handlers.add_factory::<Encoders>(Constant("encoded"));
        let key = TypeKey::of::<u8>();

        handlers.resolve::<Encoders>(&key).unwrap();
        assert!(handlers.try_resolve::<Validators>(&key).unwrap().is_none());
        assert_eq!(handlers.registry::<Encoders>().len(), 1);
        assert!(handlers.registry::<Validators>().is_empty());
    }

    #[test]
    fn validators_ignore_tag_order() {
        let mut handlers = Handlers::empty();
        handlers.add_factory::<Encoders>(Constant("encoded"));
        handlers.register_validator(|_: &u8| Ok(()));
        let custom = handlers.registry::<Validators>().custom().clone();
        handlers.registry_mut::<Validators>().push(custom);

        let ab = TypeKey::tagged::<u8>([Tag::custom("a"), Tag::custom("b")]);
        let ba = TypeKey::tagged::<u8>([Tag::custom("b"), Tag::custom("a")]);

        handlers.resolve::<Encoders>(&ab).unwrap();
        handlers.resolve::<Encoders>(&ba).unwrap();
        assert_eq!(handlers.registry::<Encoders>().len(), 2);
        assert_eq!(handlers.registry::<Validators>().len(), 1);
    }

    #[test]
    fn concurrent_requests_share_one_handler() {
        let mut handlers = Handlers::empty();
        let (factory, calls) = Counting::new();
        handlers.add_factory::<Encoders>(factory);
        let key = TypeKey::of::<u8>();

        let resolved: Vec<Arc<dyn Encoder>> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| handlers.resolve::<Encoders>(&key).unwrap()))
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(resolved.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
