use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

use super::{Codec, Decoder, Encoder, Validator};
use crate::error::CodecError;
use crate::value::Value;

/// Validates the value before encoding it.
pub struct ValidatingEncoder {
    inner: Arc<dyn Encoder>,
    validator: Arc<dyn Validator>,
}

impl ValidatingEncoder {
    #[inline]
    pub fn new(inner: Arc<dyn Encoder>, validator: Arc<dyn Validator>) -> Self {
        Self { inner, validator }
    }
}

impl Encoder for ValidatingEncoder {
    fn encode(&self, value: &dyn Any) -> Result<Value, CodecError> {
        self.validator.validate(value)?;
        self.inner.encode(value)
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{} (validated)", self.inner.label()))
    }

    fn as_codec(self: Arc<Self>) -> Option<Arc<dyn Codec>> {
        let codec = self.inner.clone().as_codec()?;
        Some(Arc::new(ValidatingCodec::new(codec, self.validator.clone())))
    }
}

/// Validates the value after decoding it.
pub struct ValidatingDecoder {
    inner: Arc<dyn Decoder>,
    validator: Arc<dyn Validator>,
}

impl ValidatingDecoder {
    #[inline]
    pub fn new(inner: Arc<dyn Decoder>, validator: Arc<dyn Validator>) -> Self {
        Self { inner, validator }
    }
}

impl Decoder for ValidatingDecoder {
    fn decode(&self, input: &Value) -> Result<Box<dyn Any>, CodecError> {
        let value = self.inner.decode(input)?;
        self.validator.validate(&*value)?;
        Ok(value)
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{} (validated)", self.inner.label()))
    }

    fn as_codec(self: Arc<Self>) -> Option<Arc<dyn Codec>> {
        let codec = self.inner.clone().as_codec()?;
        Some(Arc::new(ValidatingCodec::new(codec, self.validator.clone())))
    }
}

/// Validates before encoding and after decoding.
pub struct ValidatingCodec {
    inner: Arc<dyn Codec>,
    validator: Arc<dyn Validator>,
}

impl ValidatingCodec {
    #[inline]
    pub fn new(inner: Arc<dyn Codec>, validator: Arc<dyn Validator>) -> Self {
        Self { inner, validator }
    }
}

impl Codec for ValidatingCodec {
    fn encode(&self, value: &dyn Any) -> Result<Value, CodecError> {
        self.validator.validate(value)?;
        self.inner.encode(value)
    }

    fn decode(&self, input: &Value) -> Result<Box<dyn Any>, CodecError> {
        let value = self.inner.decode(input)?;
        self.validator.validate(&*value)?;
        Ok(value)
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!("{} (validated)", self.inner.label()))
    }

    #[inline]
    fn is_validated(&self) -> bool {
        true
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{ValidatingDecoder, ValidatingEncoder};
    use crate::error::CodecError;
    use crate::handler::{Decoder, Encoder, FnDecoder, FnEncoder, FnValidator, Validator};
    use crate::value::Value;

    fn positive() -> Arc<dyn Validator> {
        Arc::new(FnValidator::new(|v: &i64| {
            if *v > 0 {
                Ok(())
            } else {
                Err(CodecError::invalid("must be positive"))
            }
        }))
    }

    #[test]
    fn decoder_checks_after_decoding() {
        let base = Arc::new(FnDecoder::new(|v: &Value| {
            v.as_number()
                .and_then(|n| n.as_i64())
                .ok_or_else(|| CodecError::custom("not an integer"))
        }));
        let decoder = ValidatingDecoder::new(base, positive());

        let ok = decoder.decode(&Value::from(3)).unwrap();
        assert_eq!(ok.downcast_ref::<i64>(), Some(&3));

        let error = decoder.decode(&Value::from(-3)).unwrap_err();
        assert_eq!(error.to_string(), "invalid value: must be positive");
        assert_eq!(decoder.label(), "custom decoder for `i64` (validated)");
    }

    #[test]
    fn encoder_checks_before_encoding() {
        let base = Arc::new(FnEncoder::new(|v: &i64| Ok(Value::from(*v))));
        let encoder = Arc::new(ValidatingEncoder::new(base, positive()));

        assert_eq!(encoder.encode(&5_i64).unwrap(), Value::from(5));
        assert!(encoder.encode(&0_i64).is_err());
        // The closure encoder cannot decode, so neither can the wrapper.
        assert!(encoder.as_codec().is_none());
    }
}
