use std::borrow::Cow;
use std::sync::Arc;

use crate::error::ResolveError;
use crate::handler::{Codec, PairCodec};
use crate::registry::{Codecs, Context, Decoders, Encoders, Factory};

/// Builds a codec from the encoder and decoder of the same key.
///
/// A native codec is reused only when it encodes with the resolved encoder
/// and decodes with the resolved decoder: either both halves are the same
/// handler, or both report the same codec. Otherwise the two are joined in a
/// [`PairCodec`], so the codec never disagrees with the encoder or decoder of
/// its key.
pub struct ComposeFactory;

impl Factory<Codecs> for ComposeFactory {
    fn create(&self, ctx: &Context<'_, Codecs>) -> Result<Option<Arc<dyn Codec>>, ResolveError> {
        let Some(encoder) = ctx.category::<Encoders>().try_resolve()? else {
            return Ok(None);
        };
        let Some(decoder) = ctx.category::<Decoders>().try_resolve()? else {
            return Ok(None);
        };

        if core::ptr::addr_eq(Arc::as_ptr(&encoder), Arc::as_ptr(&decoder))
            && let Some(codec) = decoder.clone().as_codec()
        {
            return Ok(Some(codec));
        }
        if let (Some(encoding), Some(decoding)) =
            (encoder.clone().as_codec(), decoder.clone().as_codec())
            && Arc::ptr_eq(&encoding, &decoding)
        {
            return Ok(Some(decoding));
        }
        Ok(Some(Arc::new(PairCodec::new(encoder, decoder))))
    }

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("compose")
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::borrow::Cow;
    use std::sync::Arc;

    use crate::error::CodecError;
    use crate::handler::{Codec, Decoder, Encoder, downcast_ref};
    use crate::registry::{Codecs, Decoders, Encoders};
    use crate::{Handlers, Tag, TypeKey, Value};

    /// One object serving both directions for `u8`, as text.
    struct Text;

    impl Encoder for Text {
        fn encode(&self, value: &dyn Any) -> Result<Value, CodecError> {
            Ok(Value::from(downcast_ref::<u8>(value)?.to_string()))
        }

        fn label(&self) -> Cow<'_, str> {
            Cow::Borrowed("text")
        }

        fn as_codec(self: Arc<Self>) -> Option<Arc<dyn Codec>> {
            Some(self)
        }
    }

    impl Decoder for Text {
        fn decode(&self, input: &Value) -> Result<Box<dyn Any>, CodecError> {
            let text = input.as_str().ok_or_else(|| CodecError::custom("expected text"))?;
            let value: u8 = text.parse().map_err(|_| CodecError::custom("not a u8"))?;
            Ok(Box::new(value))
        }

        fn label(&self) -> Cow<'_, str> {
            Cow::Borrowed("text")
        }

        fn as_codec(self: Arc<Self>) -> Option<Arc<dyn Codec>> {
            Some(self)
        }
    }

    impl Codec for Text {
        fn encode(&self, value: &dyn Any) -> Result<Value, CodecError> {
            Encoder::encode(self, value)
        }

        fn decode(&self, input: &Value) -> Result<Box<dyn Any>, CodecError> {
            Decoder::decode(self, input)
        }

        fn label(&self) -> Cow<'_, str> {
            Cow::Borrowed("text")
        }
    }

    #[test]
    fn shared_handler_is_reused() {
        let mut handlers = Handlers::new();
        let text = Arc::new(Text);
        handlers.register_handler::<Encoders, u8>(text.clone());
        handlers.register_handler::<Decoders, u8>(text.clone());

        let codec = handlers.resolve::<Codecs>(&TypeKey::of::<u8>()).unwrap();
        assert!(core::ptr::addr_eq(Arc::as_ptr(&codec), Arc::as_ptr(&text)));
        assert_eq!(codec.encode(&7_u8).unwrap(), Value::from("7"));
    }

    #[test]
    fn separate_halves_are_paired() {
        let handlers = Handlers::new();
        let key = TypeKey::of::<u8>();

        let codec = handlers.resolve::<Codecs>(&key).unwrap();
        assert_eq!(codec.label(), "pair(scalar `u8`, scalar `u8`)");
        assert!(handlers.registry::<Encoders>().is_cached(&key));
        assert!(handlers.registry::<Decoders>().is_cached(&key));
    }

    #[test]
    fn codec_encodes_with_the_custom_encoder() {
        let mut handlers = Handlers::new();
        handlers.register_encoder(|v: &u8| Ok(Value::from(format!("u8:{v}"))));
        let key = TypeKey::of::<u8>();

        let encoder = handlers.resolve::<Encoders>(&key).unwrap();
        let codec = handlers.resolve::<Codecs>(&key).unwrap();
        assert_eq!(codec.encode(&7_u8).unwrap(), encoder.encode(&7_u8).unwrap());

        let decoded = codec.decode(&Value::from(7)).unwrap();
        assert_eq!(decoded.downcast_ref::<u8>(), Some(&7));
    }

    #[test]
    fn defaulted_key_is_paired() {
        let handlers = Handlers::new();
        let key = TypeKey::tagged::<u8>([Tag::default_value(3), Tag::range(0, 5)]);

        let codec = handlers.resolve::<Codecs>(&key).unwrap();
        assert!(codec.is_validated());
        assert!(codec.label().starts_with("pair("));

        let decoded = codec.decode(&Value::Empty).unwrap();
        assert_eq!(decoded.downcast_ref::<u8>(), Some(&3));
        assert!(codec.encode(&9_u8).is_err());
    }
}
