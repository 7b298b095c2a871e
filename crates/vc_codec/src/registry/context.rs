use std::marker::PhantomData;
use std::sync::Arc;

use log::debug;

use super::{Category, Factory, stack};
use crate::describe::{Descriptor, TypeCatalog};
use crate::error::ResolveError;
use crate::handlers::Handlers;
use crate::key::TypeKey;

/// A view of the facade bound to one type key and one category.
///
/// Factories receive a context for the key they are asked about, and use it
/// to resolve whatever they need: the same key in another category, nested
/// keys through [`with_type`](Self::with_type), or the rest of the chain
/// through [`try_resolve_fallback`](Self::try_resolve_fallback).
///
/// Every entry point may recurse into the registries, including the one that
/// is currently resolving this very key.
pub struct Context<'a, C: Category> {
    handlers: &'a Handlers,
    key: TypeKey,
    _marker: PhantomData<fn() -> C>,
}

impl<C: Category> Clone for Context<'_, C> {
    #[inline]
    fn clone(&self) -> Self {
        Self::new(self.handlers, self.key.clone())
    }
}

impl<'a, C: Category> Context<'a, C> {
    #[inline]
    pub(crate) fn new(handlers: &'a Handlers, key: TypeKey) -> Self {
        Self {
            handlers,
            key,
            _marker: PhantomData,
        }
    }

    /// The key this context is bound to.
    #[inline]
    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    #[inline]
    pub fn handlers(&self) -> &'a Handlers {
        self.handlers
    }

    #[inline]
    pub fn catalog(&self) -> &'a TypeCatalog {
        self.handlers.catalog()
    }

    /// The descriptor of the key's base type, if registered.
    #[inline]
    pub fn descriptor(&self) -> Option<&'a Descriptor> {
        self.catalog().get(self.key.ty().id())
    }

    /// The same category, bound to another key.
    #[inline]
    pub fn with_type(&self, key: TypeKey) -> Context<'a, C> {
        Context::new(self.handlers, key)
    }

    /// Another category, bound to the same key.
    #[inline]
    pub fn category<D: Category>(&self) -> Context<'a, D> {
        Context::new(self.handlers, self.key.clone())
    }

    // -------------------------------------------------------------------------
    // Whole chain

    /// Resolves the key through the whole chain. `Ok(None)` if no factory applies.
    #[inline]
    pub fn try_resolve(&self) -> Result<Option<Arc<C::Handler>>, ResolveError> {
        C::registry(self.handlers).resolve(self.handlers, &self.key)
    }

    /// Like [`try_resolve`](Self::try_resolve), but no match is an error.
    pub fn force_resolve(&self) -> Result<Arc<C::Handler>, ResolveError> {
        self.try_resolve()?.ok_or_else(|| self.unsatisfiable())
    }

    // -------------------------------------------------------------------------
    // One factory

    /// Asks exactly `factory`, bypassing the chain and the cache.
    #[inline]
    pub fn try_resolve_with(
        &self,
        factory: &dyn Factory<C>,
    ) -> Result<Option<Arc<C::Handler>>, ResolveError> {
        C::registry(self.handlers).resolve_with(self.handlers, &self.key, factory)
    }

    /// Like [`try_resolve_with`](Self::try_resolve_with), but no match is an error.
    pub fn force_resolve_with(
        &self,
        factory: &dyn Factory<C>,
    ) -> Result<Arc<C::Handler>, ResolveError> {
        self.try_resolve_with(factory)?
            .ok_or_else(|| self.unsatisfiable())
    }

    // -------------------------------------------------------------------------
    // Fallback

    /// Resolves the key as if `caller` and every factory before it did not exist.
    ///
    /// This is how a decorator gets the plain handler it wraps. If `caller`
    /// is not in the chain, the whole chain is used.
    #[inline]
    pub fn try_resolve_fallback(
        &self,
        caller: &dyn Factory<C>,
    ) -> Result<Option<Arc<C::Handler>>, ResolveError> {
        C::registry(self.handlers).resolve_after(self.handlers, &self.key, caller)
    }

    /// Like [`try_resolve_fallback`](Self::try_resolve_fallback), but no match is an error.
    pub fn force_resolve_fallback(
        &self,
        caller: &dyn Factory<C>,
    ) -> Result<Arc<C::Handler>, ResolveError> {
        self.try_resolve_fallback(caller)?
            .ok_or_else(|| self.unsatisfiable())
    }

    fn unsatisfiable(&self) -> ResolveError {
        debug!(
            "{}",
            stack::annotate(format_args!("no {} available for `{}`", C::NAME, self.key))
        );
        ResolveError::Unsatisfiable {
            category: C::NAME,
            key: self.key.clone(),
        }
    }
}
