use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

/// A wire number.
///
/// Floats are compared with [`f64::total_cmp`] and hashed by their bits, so
/// `Number` is `Eq + Ord + Hash` and can be stored inside [`Tag`]s.
///
/// Integers always order before floats; numeric comparison across the two
/// variants is done through [`Number::as_f64`].
///
/// [`Tag`]: crate::key::Tag
#[derive(Clone, Copy, Debug)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Returns the number as `i64` if it is an integer, or a float with
    /// no fractional part that fits in `i64`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_codec::value::Number;
    ///
    /// assert_eq!(Number::Int(3).as_i64(), Some(3));
    /// assert_eq!(Number::Float(3.0).as_i64(), Some(3));
    /// assert_eq!(Number::Float(3.5).as_i64(), None);
    /// ```
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(v),
            Self::Float(v) => {
                // `i64::MAX as f64` rounds up to 2^63, which is out of range.
                if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
                    Some(v as i64)
                } else {
                    None
                }
            }
        }
    }

    /// Returns the number as `f64`, possibly losing precision for large integers.
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    /// Returns `true` if this is [`Number::Int`].
    #[inline]
    pub const fn is_int(self) -> bool {
        matches!(self, Self::Int(_))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Number {}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b),
            (Self::Int(_), Self::Float(_)) => Ordering::Less,
            (Self::Float(_), Self::Int(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Number {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Int(v) => {
                state.write_u8(0);
                v.hash(state);
            }
            Self::Float(v) => {
                state.write_u8(1);
                v.to_bits().hash(state);
            }
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => fmt::Display::fmt(v, f),
            Self::Float(v) => fmt::Debug::fmt(v, f),
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Number {
            #[inline]
            fn from(value: $ty) -> Self {
                Self::Int(value as i64)
            }
        }
    )*};
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Number {
    #[inline]
    fn from(value: f32) -> Self {
        Self::Float(value as f64)
    }
}

impl From<f64> for Number {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Number;

    #[test]
    fn float_identity_is_bitwise() {
        assert_eq!(Number::Float(f64::NAN), Number::Float(f64::NAN));
        assert_ne!(Number::Float(0.0), Number::Float(-0.0));
        assert_ne!(Number::Int(1), Number::Float(1.0));
    }

    #[test]
    fn ints_order_before_floats() {
        assert!(Number::Int(100) < Number::Float(-1.0));
        assert!(Number::Float(-1.0) < Number::Float(0.5));
    }

    #[test]
    fn as_i64_rejects_out_of_range() {
        assert_eq!(Number::Float(1e300).as_i64(), None);
        assert_eq!(Number::Float(-2.0).as_i64(), Some(-2));
    }
}
