use std::any::Any;
use std::borrow::Cow;
use std::marker::PhantomData;

use super::{Constructor, Decoder, Encoder, Validator, downcast_ref};
use crate::error::CodecError;
use crate::value::Value;

/// An [`Encoder`] backed by a typed closure.
///
/// # Examples
///
/// ```
/// use vc_codec::Value;
/// use vc_codec::handler::{Encoder, FnEncoder};
///
/// struct Celsius(f64);
///
/// let encoder = FnEncoder::new(|c: &Celsius| Ok(Value::from(c.0)));
/// assert_eq!(encoder.encode(&Celsius(21.5)).unwrap(), Value::from(21.5));
/// assert!(encoder.encode(&21.5_f64).is_err());
/// ```
pub struct FnEncoder<T, F> {
    func: F,
    _marker: PhantomData<fn(&T)>,
}

impl<T, F> FnEncoder<T, F>
where
    T: Any,
    F: Fn(&T) -> Result<Value, CodecError> + Send + Sync + 'static,
{
    #[inline]
    pub const fn new(func: F) -> Self {
        Self {
            func,
            _marker: PhantomData,
        }
    }
}

impl<T, F> Encoder for FnEncoder<T, F>
where
    T: Any,
    F: Fn(&T) -> Result<Value, CodecError> + Send + Sync + 'static,
{
    fn encode(&self, value: &dyn Any) -> Result<Value, CodecError> {
        (self.func)(downcast_ref::<T>(value)?)
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("custom encoder for `{}`", core::any::type_name::<T>()))
    }
}

/// A [`Decoder`] backed by a typed closure.
pub struct FnDecoder<T, F> {
    func: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> FnDecoder<T, F>
where
    T: Any,
    F: Fn(&Value) -> Result<T, CodecError> + Send + Sync + 'static,
{
    #[inline]
    pub const fn new(func: F) -> Self {
        Self {
            func,
            _marker: PhantomData,
        }
    }
}

impl<T, F> Decoder for FnDecoder<T, F>
where
    T: Any,
    F: Fn(&Value) -> Result<T, CodecError> + Send + Sync + 'static,
{
    fn decode(&self, input: &Value) -> Result<Box<dyn Any>, CodecError> {
        Ok(Box::new((self.func)(input)?))
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("custom decoder for `{}`", core::any::type_name::<T>()))
    }
}

/// A [`Validator`] backed by a typed closure.
pub struct FnValidator<T, F> {
    func: F,
    _marker: PhantomData<fn(&T)>,
}

impl<T, F> FnValidator<T, F>
where
    T: Any,
    F: Fn(&T) -> Result<(), CodecError> + Send + Sync + 'static,
{
    #[inline]
    pub const fn new(func: F) -> Self {
        Self {
            func,
            _marker: PhantomData,
        }
    }
}

impl<T, F> Validator for FnValidator<T, F>
where
    T: Any,
    F: Fn(&T) -> Result<(), CodecError> + Send + Sync + 'static,
{
    fn validate(&self, value: &dyn Any) -> Result<(), CodecError> {
        (self.func)(downcast_ref::<T>(value)?)
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("custom validator for `{}`", core::any::type_name::<T>()))
    }
}

/// A [`Constructor`] backed by a typed closure.
pub struct FnConstructor<T, F> {
    func: F,
    _marker: PhantomData<fn() -> T>,
}

impl<T, F> FnConstructor<T, F>
where
    T: Any,
    F: Fn() -> T + Send + Sync + 'static,
{
    #[inline]
    pub const fn new(func: F) -> Self {
        Self {
            func,
            _marker: PhantomData,
        }
    }
}

impl<T, F> Constructor for FnConstructor<T, F>
where
    T: Any,
    F: Fn() -> T + Send + Sync + 'static,
{
    fn construct(&self) -> Result<Box<dyn Any>, CodecError> {
        Ok(Box::new((self.func)()))
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("custom constructor for `{}`", core::any::type_name::<T>()))
    }
}
