use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};

use super::{FIXED_HASH_STATE, Tags, Type, TypeKey};

/// How a [`Registry`](crate::registry::Registry) turns a [`TypeKey`] into a
/// cache key.
pub trait KeyStrategy: 'static {
    type Key: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    fn key(type_key: &TypeKey) -> Self::Key;
}

/// Tag order is part of the identity.
pub struct Ordered;

impl KeyStrategy for Ordered {
    type Key = TypeKey;

    #[inline]
    fn key(type_key: &TypeKey) -> TypeKey {
        type_key.clone()
    }
}

/// Tag order is ignored: `[Inline, NonEmpty]` and `[NonEmpty, Inline]`
/// are the same key.
pub struct Unordered;

impl KeyStrategy for Unordered {
    type Key = UnorderedKey;

    #[inline]
    fn key(type_key: &TypeKey) -> UnorderedKey {
        UnorderedKey::new(type_key)
    }
}

/// A [`TypeKey`] with its tags in canonical (sorted) order.
///
/// # Examples
///
/// ```
/// use vc_codec::{Tag, TypeKey};
/// use vc_codec::key::UnorderedKey;
///
/// let a = TypeKey::tagged::<String>([Tag::NonEmpty, Tag::alias("name")]);
/// let b = TypeKey::tagged::<String>([Tag::alias("name"), Tag::NonEmpty]);
///
/// assert_ne!(a, b);
/// assert_eq!(UnorderedKey::new(&a), UnorderedKey::new(&b));
/// ```
#[derive(Clone)]
pub struct UnorderedKey {
    hash: u64,
    ty: Type,
    tags: Tags,
}

impl UnorderedKey {
    pub fn new(type_key: &TypeKey) -> Self {
        let ty = type_key.ty();
        let tags = if type_key.tags().len() < 2 {
            type_key.tags().clone()
        } else {
            let mut sorted = type_key.tags().as_slice().to_vec();
            sorted.sort_unstable();
            Tags::from(sorted)
        };
        let hash = FIXED_HASH_STATE.hash_one((&ty, &tags));
        Self { hash, ty, tags }
    }

    #[inline(always)]
    pub const fn ty(&self) -> Type {
        self.ty
    }

    /// Returns the tags in canonical order.
    #[inline(always)]
    pub const fn tags(&self) -> &Tags {
        &self.tags
    }
}

impl PartialEq for UnorderedKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.ty == other.ty && self.tags == other.tags
    }
}

impl Eq for UnorderedKey {}

impl Hash for UnorderedKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Debug for UnorderedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnorderedKey")
            .field("ty", &self.ty)
            .field("tags", &self.tags)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{KeyStrategy, Ordered, Unordered};
    use crate::key::{Tag, TypeKey};

    #[test]
    fn strategies_disagree_on_order() {
        let a = TypeKey::tagged::<u8>([Tag::Inline, Tag::range(1, 2)]);
        let b = TypeKey::tagged::<u8>([Tag::range(1, 2), Tag::Inline]);

        assert_ne!(Ordered::key(&a), Ordered::key(&b));
        assert_eq!(Unordered::key(&a), Unordered::key(&b));
    }

    #[test]
    fn unordered_keeps_multiplicity() {
        let once = TypeKey::tagged::<u8>([Tag::Inline]);
        let twice = TypeKey::tagged::<u8>([Tag::Inline, Tag::Inline]);
        assert_ne!(Unordered::key(&once), Unordered::key(&twice));
    }
}
