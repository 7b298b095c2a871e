use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};

/// A base type.
///
/// Equality and hashing only look at the [`TypeId`], the stored paths are
/// for diagnostics.
///
/// # Examples
///
/// ```
/// use core::any::TypeId;
/// use vc_codec::Type;
///
/// let ty = Type::of::<Vec<String>>();
/// assert_eq!(ty.id(), TypeId::of::<Vec<String>>());
/// assert_eq!(ty.name(), "Vec<String>");
/// ```
#[derive(Clone, Copy)]
pub struct Type {
    id: TypeId,
    path: &'static str,
}

impl Type {
    /// Creates a new [`Type`] from a type.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            path: core::any::type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`] of the type.
    #[inline(always)]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the full type path, as given by [`core::any::type_name`].
    #[inline(always)]
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// Returns the type path with every module prefix stripped.
    ///
    /// Generic arguments are shortened too, so `alloc::vec::Vec<alloc::string::String>`
    /// becomes `Vec<String>`.
    pub fn name(&self) -> String {
        let mut out = String::with_capacity(self.path.len());
        let mut segment_start = 0;
        for (index, ch) in self.path.char_indices() {
            if matches!(ch, '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&') {
                out.push_str(last_segment(&self.path[segment_start..index]));
                out.push(ch);
                segment_start = index + ch.len_utf8();
            }
        }
        out.push_str(last_segment(&self.path[segment_start..]));
        out
    }

    /// Check if the given type matches this one.
    #[inline]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

#[inline]
fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Type {}

impl Hash for Type {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Type;

    struct Local;

    #[test]
    fn short_names() {
        assert_eq!(Type::of::<Local>().name(), "Local");
        assert_eq!(Type::of::<Option<Box<Local>>>().name(), "Option<Box<Local>>");
        assert_eq!(Type::of::<(i32, String)>().name(), "(i32, String)");
        assert_eq!(Type::of::<[u8]>().name(), "[u8]");
    }

    #[test]
    fn identity_ignores_path() {
        assert_eq!(Type::of::<Local>(), Type::of::<Local>());
        assert_ne!(Type::of::<i32>(), Type::of::<i64>());
        assert!(Type::of::<i32>().is::<i32>());
    }
}
