//! Type identities used as cache keys.
//!
//! ## Menu
//!
//! - [`Type`]: A base type, identified by its [`TypeId`](core::any::TypeId).
//! - [`Tag`]: One piece of configuration attached to a type-use site.
//! - [`Tags`]: An ordered, immutable list of [`Tag`]s.
//! - [`TypeKey`]: A base type plus its tags, with a pre-computed hash.
//! - [`KeyStrategy`]: How a registry compares type keys:
//!     - [`Ordered`]: tag order matters.
//!     - [`Unordered`]: tag order is ignored, see [`UnorderedKey`].
//!
//! Two keys with the same base type but different tags are different
//! identities and resolve to different handlers.

// -----------------------------------------------------------------------------
// Modules

mod strategy;
mod tag;
mod ty;
mod type_key;

// -----------------------------------------------------------------------------
// Exports

pub use strategy::{KeyStrategy, Ordered, Unordered, UnorderedKey};
pub use tag::{NumberRange, Tag, Tags};
pub use ty::Type;
pub use type_key::TypeKey;

use foldhash::fast::FixedState;

/// A fixed hash seed shared by every key and cache in this crate.
pub(crate) const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x95EE04C4F326B271);

/// Hash map with the crate's fixed hash state.
pub(crate) type KeyMap<K, V> = hashbrown::HashMap<K, V, FixedState>;

#[inline]
pub(crate) fn new_key_map<K, V>() -> KeyMap<K, V> {
    hashbrown::HashMap::with_hasher(FIXED_HASH_STATE)
}
