use std::any::Any;

use crate::error::CodecError;
use crate::value::{Number, Value, ValueKind};

/// A leaf type with a native wire representation.
///
/// Scalars are described with [`Descriptor::scalar`](super::Descriptor::scalar)
/// and handled by the scalar factory, which gives them a native codec.
/// Implement this for small value objects (identifiers, units, and the like)
/// that should appear on the wire as a single primitive.
///
/// # Examples
///
/// ```
/// use vc_codec::describe::Scalar;
/// use vc_codec::{CodecError, Value};
///
/// struct Celsius(f64);
///
/// impl Scalar for Celsius {
///     fn to_value(&self) -> Value {
///         Value::from(self.0)
///     }
///
///     fn from_value(input: &Value) -> Result<Self, CodecError> {
///         f64::from_value(input).map(Celsius)
///     }
///
///     fn zero() -> Self {
///         Celsius(0.0)
///     }
/// }
///
/// let warm = Celsius::from_value(&Value::from(21.5)).unwrap();
/// assert_eq!(warm.to_value(), Value::from(21.5));
/// ```
pub trait Scalar: Any + Sized {
    fn to_value(&self) -> Value;

    fn from_value(input: &Value) -> Result<Self, CodecError>;

    /// The bare value used by the scalar constructor.
    fn zero() -> Self;

    /// The numeric view checked by range validation, if any.
    fn number(&self) -> Option<Number> {
        None
    }

    /// The length checked by non-empty validation, if any.
    fn length(&self) -> Option<usize> {
        None
    }
}

#[inline]
fn unexpected(expected: ValueKind, input: &Value) -> CodecError {
    CodecError::UnexpectedKind {
        expected,
        found: input.kind(),
    }
}

impl Scalar for bool {
    #[inline]
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(input: &Value) -> Result<Self, CodecError> {
        input
            .as_bool()
            .ok_or_else(|| unexpected(ValueKind::Bool, input))
    }

    #[inline]
    fn zero() -> Self {
        false
    }
}

macro_rules! impl_scalar_int {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                #[inline]
                fn to_value(&self) -> Value {
                    match i64::try_from(*self) {
                        Ok(int) => Value::Number(Number::Int(int)),
                        Err(_) => Value::Number(Number::Float(*self as f64)),
                    }
                }

                fn from_value(input: &Value) -> Result<Self, CodecError> {
                    let number = input
                        .as_number()
                        .ok_or_else(|| unexpected(ValueKind::Number, input))?;
                    number
                        .as_i64()
                        .and_then(|int| <$ty>::try_from(int).ok())
                        .ok_or(CodecError::OutOfRange {
                            value: number,
                            target: stringify!($ty),
                        })
                }

                #[inline]
                fn zero() -> Self {
                    0
                }

                #[inline]
                fn number(&self) -> Option<Number> {
                    Some(match i64::try_from(*self) {
                        Ok(int) => Number::Int(int),
                        Err(_) => Number::Float(*self as f64),
                    })
                }
            }
        )*
    };
}

impl_scalar_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_scalar_float {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                #[inline]
                fn to_value(&self) -> Value {
                    Value::Number(Number::Float(f64::from(*self)))
                }

                fn from_value(input: &Value) -> Result<Self, CodecError> {
                    input
                        .as_number()
                        .map(|number| number.as_f64() as $ty)
                        .ok_or_else(|| unexpected(ValueKind::Number, input))
                }

                #[inline]
                fn zero() -> Self {
                    0.0
                }

                #[inline]
                fn number(&self) -> Option<Number> {
                    Some(Number::Float(f64::from(*self)))
                }
            }
        )*
    };
}

impl_scalar_float!(f32, f64);

impl Scalar for char {
    #[inline]
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }

    fn from_value(input: &Value) -> Result<Self, CodecError> {
        let text = input
            .as_str()
            .ok_or_else(|| unexpected(ValueKind::String, input))?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(CodecError::invalid(format!(
                "expected a single character, found {text:?}"
            ))),
        }
    }

    #[inline]
    fn zero() -> Self {
        '\0'
    }
}

impl Scalar for String {
    #[inline]
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(input: &Value) -> Result<Self, CodecError> {
        input
            .as_str()
            .map(String::from)
            .ok_or_else(|| unexpected(ValueKind::String, input))
    }

    #[inline]
    fn zero() -> Self {
        String::new()
    }

    #[inline]
    fn length(&self) -> Option<usize> {
        Some(self.chars().count())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Scalar;
    use crate::error::CodecError;
    use crate::value::{Number, Value};

    #[test]
    fn integers_check_bounds() {
        assert_eq!(u8::from_value(&Value::from(200)).unwrap(), 200);
        assert!(matches!(
            u8::from_value(&Value::from(300)),
            Err(CodecError::OutOfRange { target: "u8", .. })
        ));
        assert!(matches!(
            u32::from_value(&Value::from(-1)),
            Err(CodecError::OutOfRange { .. })
        ));
        // Integral floats are accepted.
        assert_eq!(i32::from_value(&Value::from(4.0)).unwrap(), 4);
        assert!(i32::from_value(&Value::from(4.5)).is_err());
    }

    #[test]
    fn huge_unsigned_falls_back_to_float() {
        assert_eq!(
            u64::MAX.to_value(),
            Value::Number(Number::Float(u64::MAX as f64))
        );
        assert_eq!(7_u64.to_value(), Value::from(7));
    }

    #[test]
    fn kinds_are_checked() {
        let error = bool::from_value(&Value::Empty).unwrap_err();
        assert_eq!(error.to_string(), "expected bool, found empty");
        assert!(String::from_value(&Value::from(1)).is_err());
        assert_eq!(char::from_value(&Value::from("x")).unwrap(), 'x');
        assert!(char::from_value(&Value::from("xy")).is_err());
    }

    #[test]
    fn views_for_validation() {
        assert_eq!(5_i32.number(), Some(Number::Int(5)));
        assert_eq!(String::from("héllo").length(), Some(5));
        assert_eq!(true.number(), None);
    }
}
