use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

use super::{Codec, Decoder, Encoder};
use crate::error::CodecError;
use crate::value::Value;

/// A [`Codec`] made of an independently resolved encoder and decoder.
///
/// Both halves come out of their registries already validated, so the pair
/// reports itself as validated.
pub struct PairCodec {
    encoder: Arc<dyn Encoder>,
    decoder: Arc<dyn Decoder>,
}

impl PairCodec {
    #[inline]
    pub fn new(encoder: Arc<dyn Encoder>, decoder: Arc<dyn Decoder>) -> Self {
        Self { encoder, decoder }
    }

    #[inline]
    pub fn encoder(&self) -> &Arc<dyn Encoder> {
        &self.encoder
    }

    #[inline]
    pub fn decoder(&self) -> &Arc<dyn Decoder> {
        &self.decoder
    }
}

impl Codec for PairCodec {
    #[inline]
    fn encode(&self, value: &dyn Any) -> Result<Value, CodecError> {
        self.encoder.encode(value)
    }

    #[inline]
    fn decode(&self, input: &Value) -> Result<Box<dyn Any>, CodecError> {
        self.decoder.decode(input)
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Owned(format!(
            "pair({}, {})",
            self.encoder.label(),
            self.decoder.label()
        ))
    }

    #[inline]
    fn is_validated(&self) -> bool {
        true
    }
}
