use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};

use super::{FIXED_HASH_STATE, Tag, Tags, Type};

/// The identity of a type-use site: a base [`Type`] plus its ordered [`Tags`].
///
/// The hash is computed once at construction, so lookups in the handler
/// caches never rehash the tag list, and equality short circuits on it.
///
/// # Examples
///
/// ```
/// use vc_codec::{Tag, TypeKey};
///
/// let plain = TypeKey::of::<i32>();
/// let percent = TypeKey::of::<i32>().with_tag(Tag::range(0, 100));
///
/// assert_ne!(plain, percent);
/// assert_eq!(percent.base(), plain);
/// assert_eq!(percent.to_string(), "i32 [range(0..=100)]");
/// ```
#[derive(Clone)]
pub struct TypeKey {
    hash: u64,
    ty: Type,
    tags: Tags,
}

impl TypeKey {
    /// Creates a key for `ty` with the given tags.
    pub fn new(ty: Type, tags: Tags) -> Self {
        let hash = FIXED_HASH_STATE.hash_one((&ty, &tags));
        Self { hash, ty, tags }
    }

    /// Creates an untagged key for `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(Type::of::<T>(), Tags::new())
    }

    /// Creates a key for `T` with the given tags.
    #[inline]
    pub fn tagged<T: ?Sized + 'static>(tags: impl Into<Tags>) -> Self {
        Self::new(Type::of::<T>(), tags.into())
    }

    /// Returns a key with the same base type and `tag` appended.
    #[inline]
    pub fn with_tag(&self, tag: Tag) -> Self {
        Self::new(self.ty, self.tags.with(tag))
    }

    /// Returns a key with the same base type and different tags.
    #[inline]
    pub fn with_tags(&self, tags: impl Into<Tags>) -> Self {
        Self::new(self.ty, tags.into())
    }

    /// Returns the untagged key of the base type.
    #[inline]
    pub fn base(&self) -> Self {
        Self::new(self.ty, Tags::new())
    }

    #[inline(always)]
    pub const fn ty(&self) -> Type {
        self.ty
    }

    #[inline(always)]
    pub const fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Returns the pre-computed hash.
    #[inline(always)]
    pub const fn hash_value(&self) -> u64 {
        self.hash
    }

    /// Check if the base type is `T`.
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.ty.is::<T>()
    }
}

impl PartialEq for TypeKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.ty == other.ty && self.tags == other.tags
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeKey")
            .field("ty", &self.ty)
            .field("tags", &self.tags)
            .finish()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.ty, f)?;
        if !self.tags.is_empty() {
            write!(f, " {}", self.tags)?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::TypeKey;
    use crate::key::{Tag, Type};

    #[test]
    fn tags_split_identity() {
        let a = TypeKey::tagged::<i64>([Tag::range(0, 100)]);
        let b = TypeKey::tagged::<i64>([Tag::range(0, 100)]);
        let c = TypeKey::tagged::<i64>([Tag::range(0, 99)]);
        assert_eq!(a, b);
        assert_eq!(a.hash_value(), b.hash_value());
        assert_ne!(a, c);
        assert_ne!(a, TypeKey::of::<i64>());
    }

    #[test]
    fn derived_keys() {
        let key = TypeKey::of::<String>()
            .with_tag(Tag::NonEmpty)
            .with_tag(Tag::alias("title"));
        assert_eq!(key.tags().len(), 2);
        assert_eq!(key.ty(), Type::of::<String>());
        assert_eq!(key.base(), TypeKey::of::<String>());
        assert!(key.is::<String>());
        assert_eq!(key.to_string(), "String [non_empty, alias(title)]");
    }
}
