use std::any::TypeId;
use std::borrow::Cow;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::ResolveError;
use crate::key::{KeyMap, new_key_map};
use crate::registry::{Category, Context, Factory};

/// Serves handlers registered for specific types.
///
/// Matches on the base type only, so a handler registered for `T` also
/// serves every tagged use of `T` that reaches this factory. Decorators
/// ahead of it in the chain still apply.
///
/// Handlers are registered through the facade, for example with
/// [`Handlers::register_encoder`](crate::Handlers::register_encoder). A
/// registration does not replace a handler that is already cached.
pub struct CustomFactory<C: Category> {
    table: RwLock<KeyMap<TypeId, Arc<C::Handler>>>,
}

impl<C: Category> Default for CustomFactory<C> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Category> CustomFactory<C> {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(new_key_map()),
        }
    }

    /// Registers `handler` for the type `type_id`, returning the one it replaces.
    pub fn insert(&self, type_id: TypeId, handler: Arc<C::Handler>) -> Option<Arc<C::Handler>> {
        self.table.write().insert(type_id, handler)
    }

    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.table.read().contains_key(&type_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }
}

impl<C: Category> Factory<C> for CustomFactory<C> {
    fn create(&self, ctx: &Context<'_, C>) -> Result<Option<Arc<C::Handler>>, ResolveError> {
        Ok(self.table.read().get(&ctx.key().ty().id()).cloned())
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("custom")
    }
}
