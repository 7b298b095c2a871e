use std::any::TypeId;

use foldhash::fast::FixedState;

use super::{Describe, Descriptor};
use crate::key::{FIXED_HASH_STATE, KeyMap, new_key_map};

// -----------------------------------------------------------------------------
// TypeCatalog

/// The store of [`Descriptor`]s the standard factories read from.
///
/// Descriptors are indexed by [`TypeId`], by full type path and by short type
/// name. A short name shared by two registered types is ambiguous and cannot
/// be looked up by name any more.
///
/// # Examples
///
/// ```
/// use vc_codec::describe::TypeCatalog;
///
/// let catalog = TypeCatalog::new();
///
/// let string = catalog.get_with_type_name("String").unwrap();
/// assert_eq!(string.ty().path(), "alloc::string::String");
/// assert!(catalog.get_with_type_path("alloc::string::String").is_some());
/// ```
pub struct TypeCatalog {
    descriptors: KeyMap<TypeId, Descriptor>,
    type_path_to_id: KeyMap<&'static str, TypeId>,
    type_name_to_id: KeyMap<String, TypeId>,
    ambiguous_names: hashbrown::HashSet<String, FixedState>,
}

impl Default for TypeCatalog {
    /// See [`TypeCatalog::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeCatalog {
    /// Creates an empty catalog.
    pub fn empty() -> Self {
        Self {
            descriptors: new_key_map(),
            type_path_to_id: new_key_map(),
            type_name_to_id: new_key_map(),
            ambiguous_names: hashbrown::HashSet::with_hasher(FIXED_HASH_STATE),
        }
    }

    /// Creates a catalog with the primitive scalars registered.
    ///
    /// - `bool` `char`
    /// - `i8 - i64` `isize`
    /// - `u8 - u64` `usize`
    /// - `f32` `f64`
    /// - `String`
    pub fn new() -> Self {
        let mut catalog = Self::empty();
        catalog.register::<bool>();
        catalog.register::<char>();
        catalog.register::<i8>();
        catalog.register::<i16>();
        catalog.register::<i32>();
        catalog.register::<i64>();
        catalog.register::<isize>();
        catalog.register::<u8>();
        catalog.register::<u16>();
        catalog.register::<u32>();
        catalog.register::<u64>();
        catalog.register::<usize>();
        catalog.register::<f32>();
        catalog.register::<f64>();
        catalog.register::<String>();
        catalog
    }

    /// Registers `T` and, recursively, every type its descriptor mentions.
    ///
    /// Registering a type twice does nothing; neither do its dependencies.
    pub fn register<T: Describe>(&mut self) {
        if self.contains(TypeId::of::<T>()) {
            return;
        }
        let descriptor = T::describe();
        let dependencies = descriptor.dependencies().to_vec();
        self.insert(descriptor);
        for register in dependencies {
            register(self);
        }
    }

    /// Inserts a descriptor unless its type is already present.
    ///
    /// Returns `false` if the type was present. Dependencies are not
    /// registered, use [`register`](Self::register) for that.
    pub fn insert(&mut self, descriptor: Descriptor) -> bool {
        let ty = descriptor.ty();
        if self.descriptors.contains_key(&ty.id()) {
            return false;
        }

        let name = ty.name();
        if !self.ambiguous_names.contains(&name) {
            if self.type_name_to_id.remove(&name).is_some() {
                log::debug!("type name `{name}` is ambiguous, look it up by path instead");
                self.ambiguous_names.insert(name);
            } else {
                self.type_name_to_id.insert(name, ty.id());
            }
        }
        self.type_path_to_id.insert(ty.path(), ty.id());
        self.descriptors.insert(ty.id(), descriptor);
        true
    }

    /// Registers every type submitted with [`auto_register!`](crate::auto_register).
    ///
    /// Repeated calls are cheap and insert nothing new.
    ///
    /// Returns `false` if the `auto_register` feature is disabled, in which
    /// case nothing happens.
    #[cfg(feature = "auto_register")]
    pub fn auto_register(&mut self) -> bool {
        for entry in inventory::iter::<crate::__macro_exports::AutoRegister> {
            (entry.0)(self);
        }
        true
    }

    /// Registers every type submitted with [`auto_register!`](crate::auto_register).
    ///
    /// The `auto_register` feature is disabled, so this does nothing and
    /// returns `false`.
    #[cfg(not(feature = "auto_register"))]
    #[inline(always)]
    pub fn auto_register(&mut self) -> bool {
        false
    }

    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.descriptors.contains_key(&type_id)
    }

    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&Descriptor> {
        self.descriptors.get(&type_id)
    }

    /// Looks a descriptor up by full type path, such as `alloc::string::String`.
    pub fn get_with_type_path(&self, type_path: &str) -> Option<&Descriptor> {
        match self.type_path_to_id.get(type_path) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    /// Looks a descriptor up by short type name, such as `String`.
    ///
    /// Returns `None` if the name is ambiguous.
    pub fn get_with_type_name(&self, type_name: &str) -> Option<&Descriptor> {
        match self.type_name_to_id.get(type_name) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    /// Returns `true` if more than one registered type has this short name.
    #[inline]
    pub fn is_ambiguous(&self, type_name: &str) -> bool {
        self.ambiguous_names.contains(type_name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Iterates over all descriptors, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Descriptor> {
        self.descriptors.values()
    }
}

// -----------------------------------------------------------------------------
// Tests
