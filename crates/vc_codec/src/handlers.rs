use std::any::{Any, TypeId};
use std::sync::Arc;

use parking_lot::ReentrantMutex;

use crate::describe::{Describe, TypeCatalog};
use crate::error::{CodecError, ResolveError};
use crate::factories::{
    BoxedFactory, ComposeFactory, DefaultValueFactory, EnumerationFactory, NonEmptyFactory,
    OptionalFactory, RangeFactory, RecordFactory, ScalarFactory, SequenceFactory,
};
use crate::handler::{FnConstructor, FnDecoder, FnEncoder, FnValidator, downcast_box};
use crate::key::TypeKey;
use crate::registry::{
    Category, Codecs, Constructors, Context, Decoders, Encoders, Factory, Populators, Registry,
    Validators,
};
use crate::value::Value;

// -----------------------------------------------------------------------------
// Handlers

/// The entry point: one [`Registry`] per category plus the [`TypeCatalog`].
///
/// Use it in two phases. During setup (`&mut self`) register types and
/// factories; afterwards resolve and invoke handlers through `&self`, from
/// any number of threads.
///
/// # Examples
///
/// ```
/// use vc_codec::describe::{Describe, Descriptor};
/// use vc_codec::{Handlers, Tag, Value};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Describe for Point {
///     fn describe() -> Descriptor {
///         Descriptor::record::<Self>()
///             .member("x", |p| &p.x, |p, v| p.x = v)
///             .member_tagged("y", [Tag::default_value(0)], |p| &p.y, |p, v| p.y = v)
///             .build()
///     }
/// }
///
/// let mut handlers = Handlers::new();
/// handlers.register::<Point>();
///
/// let wire = handlers.encode(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(wire, Value::map([("x", Value::from(1)), ("y", Value::from(2))]));
///
/// let point: Point = handlers.decode(&Value::map([("x", Value::from(3))])).unwrap();
/// assert_eq!(point, Point { x: 3, y: 0 });
/// ```
pub struct Handlers {
    catalog: TypeCatalog,
    pub(crate) encoders: Registry<Encoders>,
    pub(crate) decoders: Registry<Decoders>,
    pub(crate) codecs: Registry<Codecs>,
    pub(crate) validators: Registry<Validators>,
    pub(crate) constructors: Registry<Constructors>,
    pub(crate) populators: Registry<Populators>,
    /// Serializes cache misses across all registries, see [`Registry`].
    pub(crate) gate: ReentrantMutex<()>,
}

impl Default for Handlers {
    /// See [`Handlers::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Handlers {
    /// Creates a facade with no factories and the primitive descriptors.
    pub fn empty() -> Self {
        Self {
            catalog: TypeCatalog::new(),
            encoders: Registry::new(),
            decoders: Registry::new(),
            codecs: Registry::new(),
            validators: Registry::new(),
            constructors: Registry::new(),
            populators: Registry::new(),
            gate: ReentrantMutex::new(()),
        }
    }

    /// Creates a facade with the standard factory chains.
    ///
    /// Types submitted with [`auto_register!`](crate::auto_register) are
    /// registered too.
    ///
    /// | category     | chain |
    /// |--------------|-------|
    /// | encoder      | custom, scalar, optional, boxed, sequence, enumeration, record |
    /// | decoder      | default value, custom, scalar, optional, boxed, sequence, enumeration, record |
    /// | codec        | custom, compose |
    /// | validator    | range, non-empty, custom, optional, boxed, sequence, record |
    /// | constructor  | default value, custom, scalar, optional, boxed, sequence, record |
    /// | populator    | custom, record |
    pub fn new() -> Self {
        let mut handlers = Self::empty();
        handlers.catalog.auto_register();

        let custom = handlers.encoders.custom().clone();
        handlers.encoders.extend([
            custom as Arc<dyn Factory<Encoders>>,
            Arc::new(ScalarFactory),
            Arc::new(OptionalFactory),
            Arc::new(BoxedFactory),
            Arc::new(SequenceFactory),
            Arc::new(EnumerationFactory),
            Arc::new(RecordFactory),
        ]);

        let custom = handlers.decoders.custom().clone();
        handlers.decoders.extend([
            Arc::new(DefaultValueFactory) as Arc<dyn Factory<Decoders>>,
            custom,
            Arc::new(ScalarFactory),
            Arc::new(OptionalFactory),
            Arc::new(BoxedFactory),
            Arc::new(SequenceFactory),
            Arc::new(EnumerationFactory),
            Arc::new(RecordFactory),
        ]);

        let custom = handlers.codecs.custom().clone();
        handlers.codecs.extend([
            custom as Arc<dyn Factory<Codecs>>,
            Arc::new(ComposeFactory),
        ]);

        let custom = handlers.validators.custom().clone();
        handlers.validators.extend([
            Arc::new(RangeFactory) as Arc<dyn Factory<Validators>>,
            Arc::new(NonEmptyFactory),
            custom,
            Arc::new(OptionalFactory),
            Arc::new(BoxedFactory),
            Arc::new(SequenceFactory),
            Arc::new(RecordFactory),
        ]);

        let custom = handlers.constructors.custom().clone();
        handlers.constructors.extend([
            Arc::new(DefaultValueFactory) as Arc<dyn Factory<Constructors>>,
            custom,
            Arc::new(ScalarFactory),
            Arc::new(OptionalFactory),
            Arc::new(BoxedFactory),
            Arc::new(SequenceFactory),
            Arc::new(RecordFactory),
        ]);

        let custom = handlers.populators.custom().clone();
        handlers.populators.extend([
            custom as Arc<dyn Factory<Populators>>,
            Arc::new(RecordFactory),
        ]);

        handlers
    }

    // -------------------------------------------------------------------------
    // Setup

    #[inline]
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    #[inline]
    pub fn catalog_mut(&mut self) -> &mut TypeCatalog {
        &mut self.catalog
    }

    /// Registers `T` and the types it mentions, see [`TypeCatalog::register`].
    #[inline]
    pub fn register<T: Describe>(&mut self) {
        self.catalog.register::<T>();
    }

    /// Appends a factory to the end of a category's chain.
    #[inline]
    pub fn add_factory<C: Category>(&mut self, factory: impl Factory<C>) {
        C::registry_mut(self).push(Arc::new(factory));
    }

    /// Inserts a factory at the front of a category's chain, ahead of all others.
    #[inline]
    pub fn add_factory_first<C: Category>(&mut self, factory: impl Factory<C>) {
        C::registry_mut(self).push_front(Arc::new(factory));
    }

    /// Registers a handler of category `C` for the type `T`.
    ///
    /// It is served by the category's [`CustomFactory`](crate::factories::CustomFactory),
    /// which the standard chains include.
    pub fn register_handler<C: Category, T: Any>(&mut self, handler: Arc<C::Handler>) {
        if C::registry(self).custom().insert(TypeId::of::<T>(), handler).is_some() {
            log::debug!(
                "replaced the custom {} for `{}`",
                C::NAME,
                core::any::type_name::<T>()
            );
        }
    }

    /// Registers a closure encoding `T`.
    pub fn register_encoder<T, F>(&mut self, func: F)
    where
        T: Any,
        F: Fn(&T) -> Result<Value, CodecError> + Send + Sync + 'static,
    {
        self.register_handler::<Encoders, T>(Arc::new(FnEncoder::new(func)));
    }

    /// Registers a closure decoding `T`.
    pub fn register_decoder<T, F>(&mut self, func: F)
    where
        T: Any,
        F: Fn(&Value) -> Result<T, CodecError> + Send + Sync + 'static,
    {
        self.register_handler::<Decoders, T>(Arc::new(FnDecoder::new(func)));
    }

    /// Registers a closure validating `T`.
    pub fn register_validator<T, F>(&mut self, func: F)
    where
        T: Any,
        F: Fn(&T) -> Result<(), CodecError> + Send + Sync + 'static,
    {
        self.register_handler::<Validators, T>(Arc::new(FnValidator::new(func)));
    }

    /// Registers a closure constructing a bare `T`.
    pub fn register_constructor<T, F>(&mut self, func: F)
    where
        T: Any,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register_handler::<Constructors, T>(Arc::new(FnConstructor::new(func)));
    }

    // -------------------------------------------------------------------------
    // Resolution

    #[inline]
    pub fn registry<C: Category>(&self) -> &Registry<C> {
        C::registry(self)
    }

    #[inline]
    pub fn registry_mut<C: Category>(&mut self) -> &mut Registry<C> {
        C::registry_mut(self)
    }

    /// A resolution context bound to `key`.
    #[inline]
    pub fn context<C: Category>(&self, key: TypeKey) -> Context<'_, C> {
        Context::new(self, key)
    }

    /// Resolves a handler, `Ok(None)` if no factory applies.
    #[inline]
    pub fn try_resolve<C: Category>(
        &self,
        key: &TypeKey,
    ) -> Result<Option<Arc<C::Handler>>, ResolveError> {
        C::registry(self).resolve(self, key)
    }

    /// Resolves a handler, failing with [`ResolveError::Unsatisfiable`] if no
    /// factory applies.
    #[inline]
    pub fn resolve<C: Category>(&self, key: &TypeKey) -> Result<Arc<C::Handler>, ResolveError> {
        self.context::<C>(key.clone()).force_resolve()
    }

    // -------------------------------------------------------------------------
    // Invocation

    /// Encodes a value with the encoder of `key`.
    pub fn encode_keyed(&self, key: &TypeKey, value: &dyn Any) -> Result<Value, CodecError> {
        self.resolve::<Encoders>(key)?.encode(value)
    }

    /// Decodes a value with the decoder of `key`.
    pub fn decode_keyed(&self, key: &TypeKey, input: &Value) -> Result<Box<dyn Any>, CodecError> {
        self.resolve::<Decoders>(key)?.decode(input)
    }

    /// Validates a value with the validator of `key`. No validator means valid.
    pub fn validate_keyed(&self, key: &TypeKey, value: &dyn Any) -> Result<(), CodecError> {
        match self.try_resolve::<Validators>(key)? {
            Some(validator) => validator.validate(value),
            None => Ok(()),
        }
    }

    /// Creates a bare value with the constructor of `key`.
    pub fn construct_keyed(&self, key: &TypeKey) -> Result<Box<dyn Any>, CodecError> {
        self.resolve::<Constructors>(key)?.construct()
    }

    /// Fills `target` in place with the populator of `key`.
    pub fn populate_keyed(
        &self,
        key: &TypeKey,
        target: &mut dyn Any,
        input: &Value,
    ) -> Result<(), CodecError> {
        self.resolve::<Populators>(key)?.populate(target, input)
    }

    /// Encodes `value` as an untagged `T`.
    #[inline]
    pub fn encode<T: Any>(&self, value: &T) -> Result<Value, CodecError> {
        self.encode_keyed(&TypeKey::of::<T>(), value)
    }

    /// Decodes an untagged `T`.
    #[inline]
    pub fn decode<T: Any>(&self, input: &Value) -> Result<T, CodecError> {
        downcast_box(self.decode_keyed(&TypeKey::of::<T>(), input)?)
    }

    /// Validates `value` as an untagged `T`.
    #[inline]
    pub fn validate<T: Any>(&self, value: &T) -> Result<(), CodecError> {
        self.validate_keyed(&TypeKey::of::<T>(), value)
    }

    /// Creates a bare untagged `T`.
    #[inline]
    pub fn construct<T: Any>(&self) -> Result<T, CodecError> {
        downcast_box(self.construct_keyed(&TypeKey::of::<T>())?)
    }

    /// Fills `target` in place as an untagged `T`.
    #[inline]
    pub fn populate<T: Any>(&self, target: &mut T, input: &Value) -> Result<(), CodecError> {
        self.populate_keyed(&TypeKey::of::<T>(), target, input)
    }
}
